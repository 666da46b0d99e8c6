//! Reserved locator query keys.
//!
//! These keys form version 1 of the locator wire contract. The proxy writes
//! `drf`, `drid`, `drv` into every locator it issues (and `m` on creation);
//! URL managers write `pk1`, `pk2`, ... for public keys. Driver-defined query
//! keys must stay outside this namespace; on collision the reserved value wins.

/// Driver family (`"memory"`, `"database"`, `"blockchain"`, ...).
pub const DRIVER_FAMILY: &str = "drf";

/// Driver identifier, unique per driver within one proxy.
pub const DRIVER_IDENTIFIER: &str = "drid";

/// Version of the driver that wrote the item.
pub const DRIVER_VERSION: &str = "drv";

/// Mutability flag, `1` or `0`. Written on creation only.
pub const MUTABLE: &str = "m";

/// Prefix of positionally indexed public key entries.
pub const PUBLIC_KEY_PREFIX: &str = "pk";

/// The fixed driver-selection keys.
pub const SELECTION_KEYS: [&str; 4] = [DRIVER_FAMILY, DRIVER_IDENTIFIER, DRIVER_VERSION, MUTABLE];

/// Query key for the public key at `index` (zero-based): `pk1`, `pk2`, ...
pub fn public_key_param(index: usize) -> String {
    format!("{PUBLIC_KEY_PREFIX}{}", index + 1)
}

/// Returns `true` if `key` is a `pkN` entry with `N >= 1`.
pub fn is_public_key_param(key: &str) -> bool {
    key.strip_prefix(PUBLIC_KEY_PREFIX)
        .and_then(|n| n.parse::<usize>().ok())
        .is_some_and(|n| n >= 1)
}

/// Returns `true` if `key` belongs to the reserved namespace.
pub fn is_reserved(key: &str) -> bool {
    SELECTION_KEYS.contains(&key) || is_public_key_param(key)
}
