//! Domain identifier types.

mod id;

pub use id::{AuthId, ProfileId};
