//! Users module - the signed-in user's profile.

mod users_model;
mod users_traits;

pub use users_model::UserInfo;
pub use users_traits::UserRepositoryTrait;
