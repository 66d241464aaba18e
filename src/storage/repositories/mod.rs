//! Repository traits and their SQLite implementations.

mod credentials;
mod pokemon;

pub use credentials::{CredentialRepository, SqlxCredentialRepository};
pub use pokemon::{Evolution, Pokemon, PokemonPatch, PokemonRepository, SqlxPokemonRepository};
