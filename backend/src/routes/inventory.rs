pub const HEALTH: &str = "/health";
pub const INVENTORY: &str = "/inventory";
pub const INVENTORY_UPDATE: &str = "/inventory/update";

/// Prefix every versioned route is mounted under.
pub const API_PREFIX: &str = "/api/v1";
