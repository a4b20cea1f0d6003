//! Seeded generator of synthetic schemas.
//!
//! Tables are emitted in dependency order: every foreign key points at an
//! earlier table (or, when requested, at a table that does not exist).

use crate::schema::{Column, Schema, SqlType, Table};
use rand::distr::{Distribution, StandardUniform};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::str::FromStr;

const NOUNS: &[&str] = &[
    "users", "orders", "products", "invoices", "payments", "customers", "suppliers",
    "shipments", "categories", "reviews", "tags", "carts", "addresses", "sessions",
    "projects", "tasks", "comments", "teams", "roles", "permissions",
];

const ATTRIBUTES: &[(&str, SqlType)] = &[
    ("name", SqlType::VarChar(255)),
    ("email", SqlType::VarChar(255)),
    ("title", SqlType::Text),
    ("status", SqlType::VarChar(32)),
    ("amount", SqlType::Decimal(10, 2)),
    ("quantity", SqlType::Integer),
    ("active", SqlType::Boolean),
    ("created_at", SqlType::Timestamp),
    ("due_date", SqlType::Date),
    ("notes", SqlType::Text),
];

/// Generation scale presets
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scale {
    /// 8 tables
    Small,
    /// 40 tables
    Medium,
    /// 200 tables
    Large,
}

impl Scale {
    pub fn tables(&self) -> usize {
        match self {
            Scale::Small => 8,
            Scale::Medium => 40,
            Scale::Large => 200,
        }
    }
}

impl FromStr for Scale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "small" => Ok(Scale::Small),
            "medium" => Ok(Scale::Medium),
            "large" => Ok(Scale::Large),
            _ => Err(format!(
                "Unknown scale: {}. Valid options: small, medium, large",
                s
            )),
        }
    }
}

/// Shape of the generated schema
#[derive(Debug, Clone, PartialEq)]
pub struct GenConfig {
    pub tables: usize,
    /// Maximum plain attribute columns per table (besides `id` and FKs)
    pub max_attributes: usize,
    /// Maximum foreign keys per table
    pub max_foreign_keys: usize,
    /// Probability that one foreign key targets a missing table
    pub dangling_probability: f64,
}

impl GenConfig {
    pub fn for_scale(scale: Scale) -> Self {
        Self {
            tables: scale.tables(),
            ..Self::default()
        }
    }
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            tables: 8,
            max_attributes: 4,
            max_foreign_keys: 2,
            dangling_probability: 0.0,
        }
    }
}

/// Main schema generator
pub struct Generator {
    rng: StdRng,
    config: GenConfig,
}

impl Generator {
    pub fn new(seed: u64, scale: Scale) -> Self {
        Self::with_config(seed, GenConfig::for_scale(scale))
    }

    pub fn with_config(seed: u64, config: GenConfig) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            config,
        }
    }

    /// Generate a schema
    pub fn generate(&mut self) -> Schema {
        let mut schema = Schema::new();

        for i in 0..self.config.tables {
            let name = table_name(i);
            let mut table = Table::new(&name).column(Column::new("id", SqlType::Integer).primary_key());

            let attributes = self.below(self.config.max_attributes + 1);
            for a in 0..attributes {
                let (attr, sql_type) = ATTRIBUTES[(i + a) % ATTRIBUTES.len()];
                table = table.column(Column::new(attr, sql_type));
            }

            if i > 0 {
                let fk_count = self.below(self.config.max_foreign_keys.min(i) + 1);
                let mut used: Vec<usize> = Vec::new();
                for _ in 0..fk_count {
                    let target = self.below(i);
                    if used.contains(&target) {
                        continue;
                    }
                    used.push(target);

                    let target_name = table_name(target);
                    table = table.column(
                        Column::new(format!("{}_id", target_name), SqlType::Integer)
                            .references(target_name, "id"),
                    );
                }
            }

            if self.config.dangling_probability > 0.0 && self.chance(self.config.dangling_probability)
            {
                let missing = format!("missing_{}", i);
                table = table.column(
                    Column::new(format!("{}_id", missing), SqlType::Integer).references(missing, "id"),
                );
            }

            schema.add_table(table);
        }

        schema
    }

    /// Uniform integer in `0..n` (0 when `n` is 0)
    fn below(&mut self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        let u: f64 = StandardUniform.sample(&mut self.rng);
        ((u * n as f64) as usize).min(n - 1)
    }

    fn chance(&mut self, p: f64) -> bool {
        let u: f64 = StandardUniform.sample(&mut self.rng);
        u < p
    }
}

/// Unique table name for position `i`
pub fn table_name(i: usize) -> String {
    let noun = NOUNS[i % NOUNS.len()];
    match i / NOUNS.len() {
        0 => noun.to_string(),
        round => format!("{}_{}", noun, round),
    }
}
