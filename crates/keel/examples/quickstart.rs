//! Minimal tour: define an entity, filter it dynamically, page it, and
//! watch the staged writes land on commit.
//!
//! ```sh
//! cargo run -p keel --example quickstart
//! ```

use keel::prelude::*;
use std::sync::Arc;

#[derive(Clone, Debug, Default)]
struct Port {
    id: i64,
    name: String,
    country: String,
    berths: u64,
}

impl Entity for Port {
    type Key = i64;

    const NAME: &'static str = "port";
    const PRIMARY_KEY: &'static str = "id";
    const FIELDS: FieldRegistry<Self> = FieldRegistry::new(
        &[
            FieldDef {
                name: "id",
                kind: ValueKind::Int,
                get: |e: &Port| Value::Int(e.id),
            },
            FieldDef {
                name: "name",
                kind: ValueKind::Text,
                get: |e: &Port| Value::Text(e.name.clone()),
            },
            FieldDef {
                name: "country",
                kind: ValueKind::Text,
                get: |e: &Port| Value::Text(e.country.clone()),
            },
            FieldDef {
                name: "berths",
                kind: ValueKind::Uint,
                get: |e: &Port| Value::Uint(e.berths),
            },
        ],
        &[],
    );

    fn key(&self) -> i64 {
        self.id
    }
}

fn port(id: i64, name: &str, country: &str, berths: u64) -> Port {
    Port {
        id,
        name: name.to_owned(),
        country: country.to_owned(),
        berths,
    }
}

#[tokio::main]
async fn main() -> Result<(), keel::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .init();

    let source = Arc::new(MemorySource::with_rows(vec![
        port(1, "Rotterdam", "NL", 90),
        port(2, "Antwerp", "BE", 70),
        port(3, "Hamburg", "DE", 60),
        port(4, "Amsterdam", "NL", 30),
    ]));
    let repo = Repository::new(Arc::clone(&source), Session::new("harbormaster"));

    // one clause built dynamically, one merged in with OR
    let busy = Predicate::build("berths", Operator::Gte, 60u64)?;
    let dutch = Predicate::build("country", Operator::Eq, "NL")?;
    let filter = Predicate::combine_or(Some(busy), dutch);

    let page = repo
        .list(
            Query::new()
                .filter(filter)
                .order_by_desc("berths")
                .page_index(1)
                .page_size(3),
        )
        .await?;
    for p in &page {
        println!("{:>3} berths  {} ({})", p.berths, p.name, p.country);
    }

    // stage, then commit
    repo.insert(port(0, "Le Havre", "FR", 40)).await?;
    let applied = repo.commit().await?;
    println!("committed {applied} staged write(s); extent = {}", source.len());

    Ok(())
}
