//! Cart/session store.
//!
//! A per-visitor container holding the cart and the signed-in user. It
//! hydrates from a [`KeyValueStorage`] and writes every change straight back,
//! so the storage is the only persistence boundary for `cart`, `user` and the
//! bearer token.
//!
//! Mutations are synchronous and last-writer-wins; there is no merging of
//! concurrent edits.
//!
//! ```
//! use luxe_core::store::{CartStore, MemoryStorage};
//! use luxe_core::{NewCartItem, Price, ProductId};
//!
//! let mut store = CartStore::hydrate(MemoryStorage::default());
//! let lamp = NewCartItem {
//!     id: ProductId::new("p1"),
//!     name: "آباژور".into(),
//!     price: Price::toman(450_000),
//!     image: String::new(),
//!     stock: None,
//! };
//! store.add_to_cart(lamp.clone());
//! store.add_to_cart(lamp);
//! assert_eq!(store.item_count(), 2);
//! assert_eq!(store.items().len(), 1);
//! ```

use std::collections::HashMap;

use crate::types::phone::strip_account_prefix;
use crate::types::{Address, CartItem, NewCartItem, Price, ProductId, ProfilePayload, Role, User};

/// Storage keys used by the store.
pub mod keys {
    /// JSON array of cart items.
    pub const CART: &str = "cart";

    /// JSON user object.
    pub const USER: &str = "user";

    /// Bearer token.
    pub const TOKEN: &str = "token";

    /// Bearer token, legacy key kept in sync with [`TOKEN`].
    pub const AUTH_TOKEN: &str = "auth-token";

    /// Every key the store owns.
    pub const ALL: [&str; 4] = [CART, USER, TOKEN, AUTH_TOKEN];
}

/// Largest quantity a single cart line can hold.
pub const MAX_LINE_QUANTITY: u32 = 999;

/// String key/value persistence, shaped like browser local storage.
pub trait KeyValueStorage {
    fn get_item(&self, key: &str) -> Option<String>;

    fn set_item(&mut self, key: &str, value: String);

    fn remove_item(&mut self, key: &str);
}

/// In-memory storage for tests and tools.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_owned(), value);
    }

    fn remove_item(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// The cart and user of a single visitor.
#[derive(Debug)]
pub struct CartStore<S> {
    storage: S,
    items: Vec<CartItem>,
    user: Option<User>,
    initialized: bool,
}

impl<S: KeyValueStorage> CartStore<S> {
    /// Read `cart` and `user` from storage.
    ///
    /// Malformed values are logged and ignored; the store starts empty for
    /// that part instead of failing.
    pub fn hydrate(storage: S) -> Self {
        let items = read_json::<Vec<CartItem>>(&storage, keys::CART).unwrap_or_default();
        let user = read_json::<User>(&storage, keys::USER);

        Self {
            storage,
            items,
            user,
            initialized: true,
        }
    }

    /// Whether the store has read its storage.
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .map(|i| i.quantity)
            .fold(0, u32::saturating_add)
    }

    /// Σ price × quantity.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }

    #[must_use]
    pub fn contains(&self, id: &ProductId) -> bool {
        self.items.iter().any(|i| &i.id == id)
    }

    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|i| &i.id == id)
    }

    /// Bearer token from `token`, else `auth-token`.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.storage
            .get_item(keys::TOKEN)
            .or_else(|| self.storage.get_item(keys::AUTH_TOKEN))
            .filter(|t| !t.is_empty())
    }

    /// Store the bearer token under both keys.
    pub fn set_token(&mut self, token: &str) {
        self.storage.set_item(keys::TOKEN, token.to_owned());
        self.storage.set_item(keys::AUTH_TOKEN, token.to_owned());
    }

    /// Add one unit of a product, merging with an existing line.
    ///
    /// An existing line keeps its price; only the quantity grows.
    pub fn add_to_cart(&mut self, item: NewCartItem) {
        if let Some(existing) = self.items.iter_mut().find(|i| i.id == item.id) {
            existing.quantity = existing.quantity.saturating_add(1).min(MAX_LINE_QUANTITY);
        } else {
            self.items.push(item.with_quantity(1));
        }
        self.persist_cart();
    }

    pub fn remove_from_cart(&mut self, id: &ProductId) {
        self.items.retain(|i| &i.id != id);
        self.persist_cart();
    }

    /// Set a line's quantity; zero or less removes the line.
    ///
    /// Quantities are capped at [`MAX_LINE_QUANTITY`].
    pub fn update_quantity(&mut self, id: &ProductId, quantity: i64) {
        if quantity <= 0 {
            self.remove_from_cart(id);
            return;
        }
        let quantity = u32::try_from(quantity)
            .unwrap_or(u32::MAX)
            .min(MAX_LINE_QUANTITY);
        if let Some(line) = self.items.iter_mut().find(|i| &i.id == id) {
            line.quantity = quantity;
        }
        self.persist_cart();
    }

    pub fn clear_cart(&mut self) {
        self.items.clear();
        self.persist_cart();
    }

    /// Sign a visitor in from the OTP verification result.
    ///
    /// Profile fields from the backend win; gaps are filled from the cleaned
    /// phone, and roles fall back to the `roles` argument and then `USER`.
    pub fn login(
        &mut self,
        phone: &str,
        roles: Option<Vec<Role>>,
        api_user: Option<ProfilePayload>,
    ) {
        let clean_phone = strip_account_prefix(phone).to_owned();

        let user = match api_user {
            Some(api) => {
                let username = api
                    .username
                    .clone()
                    .filter(|u| !u.is_empty())
                    .or_else(|| api.phone.clone().filter(|p| !p.is_empty()))
                    .unwrap_or_else(|| clean_phone.clone());
                User {
                    id: api.id.unwrap_or_default(),
                    phone: api
                        .phone
                        .filter(|p| !p.is_empty())
                        .unwrap_or_else(|| clean_phone.clone()),
                    username,
                    first_name: api.first_name,
                    last_name: api.last_name,
                    email: api.email,
                    roles: api.roles.or(roles).unwrap_or_else(|| vec![Role::User]),
                    addresses: api.addresses.unwrap_or_default(),
                    extra: api.extra,
                }
            }
            None => User {
                id: crate::UserId::default(),
                phone: clean_phone.clone(),
                username: clean_phone,
                first_name: None,
                last_name: None,
                email: None,
                roles: roles.unwrap_or_else(|| vec![Role::User]),
                addresses: Vec::new(),
                extra: serde_json::Map::new(),
            },
        };

        tracing::debug!(user_id = %user.id, admin = user.is_admin(), "Visitor signed in");
        self.user = Some(user);
        self.persist_user();

        if let Some(token) = self.token() {
            self.set_token(&token);
        }
    }

    /// Forget the user, the token and the cart.
    pub fn logout(&mut self) {
        self.user = None;
        self.items.clear();
        for key in keys::ALL {
            self.storage.remove_item(key);
        }
    }

    /// Append an address the backend has confirmed. No-op when anonymous.
    pub fn add_address(&mut self, address: Address) {
        if let Some(user) = self.user.as_mut() {
            user.addresses.push(address);
            self.persist_user();
        }
    }

    fn persist_cart(&mut self) {
        write_json(&mut self.storage, keys::CART, &self.items);
    }

    fn persist_user(&mut self) {
        match &self.user {
            Some(user) => write_json(&mut self.storage, keys::USER, user),
            None => self.storage.remove_item(keys::USER),
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(
    storage: &impl KeyValueStorage,
    key: &str,
) -> Option<T> {
    let raw = storage.get_item(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "Ignoring malformed stored value");
            None
        }
    }
}

fn write_json<T: serde::Serialize>(storage: &mut impl KeyValueStorage, key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(json) => storage.set_item(key, json),
        Err(e) => tracing::error!(key, error = %e, "Failed to serialize stored value"),
    }
}
