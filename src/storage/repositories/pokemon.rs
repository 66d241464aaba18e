//! Pokémon repository.
//!
//! Array-valued fields (`type`, `weaknesses`, `multipliers`,
//! `prev_evolution`) are stored as JSON text columns and parsed on read.

use crate::errors::{Error, Result};
use crate::storage::DbPool;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracing::instrument;
use utoipa::ToSchema;

/// A single entry in an evolution chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Evolution {
    pub num: String,
    pub name: String,
}

/// A Pokédex entry. Field names follow the classic Pokédex JSON dataset,
/// including `type` for the type list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Pokemon {
    pub id: i64,
    pub num: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
    #[serde(rename = "type")]
    pub types: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub egg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multipliers: Option<Vec<f64>>,
    pub weaknesses: Vec<String>,
    pub spawn_chance: f64,
    pub avg_spawns: f64,
    pub spawn_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev_evolution: Option<Vec<Evolution>>,
}

/// Partial update to a Pokédex entry. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PokemonPatch {
    pub num: Option<String>,
    pub name: Option<String>,
    pub img: Option<String>,
    #[serde(rename = "type")]
    pub types: Option<Vec<String>>,
    pub height: Option<String>,
    pub weight: Option<String>,
    pub candy: Option<String>,
    pub egg: Option<String>,
    pub multipliers: Option<Vec<f64>>,
    pub weaknesses: Option<Vec<String>>,
    pub spawn_chance: Option<f64>,
    pub avg_spawns: Option<f64>,
    pub spawn_time: Option<String>,
    pub prev_evolution: Option<Vec<Evolution>>,
}

#[derive(Debug, Clone, FromRow)]
struct PokemonRow {
    pub id: i64,
    pub num: String,
    pub name: String,
    pub img: Option<String>,
    pub types: String, // JSON array stored as string
    pub height: Option<String>,
    pub weight: Option<String>,
    pub candy: Option<String>,
    pub egg: Option<String>,
    pub multipliers: Option<String>,
    pub weaknesses: String,
    pub spawn_chance: f64,
    pub avg_spawns: f64,
    pub spawn_time: String,
    pub prev_evolution: Option<String>,
}

#[async_trait]
pub trait PokemonRepository: Send + Sync {
    /// Insert a new entry. The caller supplies the Pokédex id.
    async fn create(&self, pokemon: Pokemon) -> Result<Pokemon>;

    /// List all entries ordered by id
    async fn list(&self) -> Result<Vec<Pokemon>>;

    /// Fetch an entry by id
    async fn get(&self, id: i64) -> Result<Option<Pokemon>>;

    /// Apply a partial update; errors if the entry does not exist
    async fn update(&self, id: i64, patch: PokemonPatch) -> Result<Pokemon>;

    /// Delete an entry; errors if it does not exist
    async fn delete(&self, id: i64) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct SqlxPokemonRepository {
    pool: DbPool,
}

impl SqlxPokemonRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn row_to_pokemon(&self, row: PokemonRow) -> Result<Pokemon> {
        Ok(Pokemon {
            id: row.id,
            num: row.num,
            name: row.name,
            img: row.img,
            types: parse_json_column(&row.types, "types")?,
            height: row.height,
            weight: row.weight,
            candy: row.candy,
            egg: row.egg,
            multipliers: row
                .multipliers
                .as_deref()
                .map(|s| parse_json_column(s, "multipliers"))
                .transpose()?,
            weaknesses: parse_json_column(&row.weaknesses, "weaknesses")?,
            spawn_chance: row.spawn_chance,
            avg_spawns: row.avg_spawns,
            spawn_time: row.spawn_time,
            prev_evolution: row
                .prev_evolution
                .as_deref()
                .map(|s| parse_json_column(s, "prev_evolution"))
                .transpose()?,
        })
    }
}

fn parse_json_column<T: serde::de::DeserializeOwned>(raw: &str, column: &str) -> Result<T> {
    serde_json::from_str(raw)
        .map_err(|e| Error::validation(format!("Invalid JSON in column '{}': {}", column, e)))
}

fn to_json_column<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value)
        .map_err(|e| Error::internal(format!("Failed to serialize JSON column: {}", e)))
}

#[async_trait]
impl PokemonRepository for SqlxPokemonRepository {
    #[instrument(skip(self, pokemon), fields(pokemon_id = pokemon.id, pokemon_name = %pokemon.name), name = "db_create_pokemon")]
    async fn create(&self, pokemon: Pokemon) -> Result<Pokemon> {
        sqlx::query(
            r#"
            INSERT INTO pokemons (id, num, name, img, types, height, weight, candy, egg,
                                  multipliers, weaknesses, spawn_chance, avg_spawns,
                                  spawn_time, prev_evolution)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(pokemon.id)
        .bind(&pokemon.num)
        .bind(&pokemon.name)
        .bind(&pokemon.img)
        .bind(to_json_column(&pokemon.types)?)
        .bind(&pokemon.height)
        .bind(&pokemon.weight)
        .bind(&pokemon.candy)
        .bind(&pokemon.egg)
        .bind(pokemon.multipliers.as_ref().map(to_json_column).transpose()?)
        .bind(to_json_column(&pokemon.weaknesses)?)
        .bind(pokemon.spawn_chance)
        .bind(pokemon.avg_spawns)
        .bind(&pokemon.spawn_time)
        .bind(pokemon.prev_evolution.as_ref().map(to_json_column).transpose()?)
        .execute(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to create pokemon".to_string(),
        })?;

        self.get(pokemon.id)
            .await?
            .ok_or_else(|| Error::internal("Pokemon not found after creation"))
    }

    #[instrument(skip(self), name = "db_list_pokemons")]
    async fn list(&self) -> Result<Vec<Pokemon>> {
        let rows = sqlx::query_as::<_, PokemonRow>("SELECT * FROM pokemons ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|err| Error::Database {
                source: err,
                context: "Failed to list pokemons".to_string(),
            })?;

        rows.into_iter().map(|r| self.row_to_pokemon(r)).collect()
    }

    #[instrument(skip(self), fields(pokemon_id = id), name = "db_get_pokemon")]
    async fn get(&self, id: i64) -> Result<Option<Pokemon>> {
        let row = sqlx::query_as::<_, PokemonRow>("SELECT * FROM pokemons WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| Error::Database {
                source: err,
                context: "Failed to fetch pokemon".to_string(),
            })?;

        row.map(|r| self.row_to_pokemon(r)).transpose()
    }

    #[instrument(skip(self, patch), fields(pokemon_id = id), name = "db_update_pokemon")]
    async fn update(&self, id: i64, patch: PokemonPatch) -> Result<Pokemon> {
        let current = self
            .get(id)
            .await?
            .ok_or_else(|| Error::not_found("Pokemon", id.to_string()))?;

        let merged = Pokemon {
            id: current.id,
            num: patch.num.unwrap_or(current.num),
            name: patch.name.unwrap_or(current.name),
            img: patch.img.or(current.img),
            types: patch.types.unwrap_or(current.types),
            height: patch.height.or(current.height),
            weight: patch.weight.or(current.weight),
            candy: patch.candy.or(current.candy),
            egg: patch.egg.or(current.egg),
            multipliers: patch.multipliers.or(current.multipliers),
            weaknesses: patch.weaknesses.unwrap_or(current.weaknesses),
            spawn_chance: patch.spawn_chance.unwrap_or(current.spawn_chance),
            avg_spawns: patch.avg_spawns.unwrap_or(current.avg_spawns),
            spawn_time: patch.spawn_time.unwrap_or(current.spawn_time),
            prev_evolution: patch.prev_evolution.or(current.prev_evolution),
        };

        sqlx::query(
            r#"
            UPDATE pokemons
            SET num = $1, name = $2, img = $3, types = $4, height = $5, weight = $6,
                candy = $7, egg = $8, multipliers = $9, weaknesses = $10,
                spawn_chance = $11, avg_spawns = $12, spawn_time = $13, prev_evolution = $14
            WHERE id = $15
            "#,
        )
        .bind(&merged.num)
        .bind(&merged.name)
        .bind(&merged.img)
        .bind(to_json_column(&merged.types)?)
        .bind(&merged.height)
        .bind(&merged.weight)
        .bind(&merged.candy)
        .bind(&merged.egg)
        .bind(merged.multipliers.as_ref().map(to_json_column).transpose()?)
        .bind(to_json_column(&merged.weaknesses)?)
        .bind(merged.spawn_chance)
        .bind(merged.avg_spawns)
        .bind(&merged.spawn_time)
        .bind(merged.prev_evolution.as_ref().map(to_json_column).transpose()?)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to update pokemon".to_string(),
        })?;

        Ok(merged)
    }

    #[instrument(skip(self), fields(pokemon_id = id), name = "db_delete_pokemon")]
    async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM pokemons WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|err| Error::Database {
                source: err,
                context: "Failed to delete pokemon".to_string(),
            })?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found("Pokemon", id.to_string()));
        }

        Ok(())
    }
}
