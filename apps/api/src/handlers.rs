pub mod delegations;
pub mod field_security;
pub mod gates;
pub mod health;
pub mod permissions;
pub mod security;

#[cfg(test)]
mod tests;
