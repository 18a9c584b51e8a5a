pub mod back_shared;

/// Loads `.env` and forces every setting, so misconfiguration panics at
/// startup instead of on the first request.
pub fn validate() {
    dotenvy::dotenv().ok();
    back_shared::validate();
}
