use sqlx::PgPool;

use crate::model::Transaction;

/// The two append-only store partitions. A record lands in exactly one of
/// them, decided by the upstream scoring process.
pub const FRAUD_TABLE: &str = "fraud_transactions";
pub const LEGIT_TABLE: &str = "legit_transactions";

/// Per-partition totals used by the server-side stats query.
#[derive(Debug, Clone, Copy, Default)]
pub struct PartitionTotals {
    pub count: i64,
    pub amount_sum: f64,
}

/// Fetch every record from one partition in store-native (insertion) order.
/// Documents that no longer decode are skipped with a warning rather than
/// failing the whole query.
pub async fn fetch_partition(pool: &PgPool, table: &str) -> eyre::Result<Vec<Transaction>> {
    let rows: Vec<(serde_json::Value,)> =
        sqlx::query_as(&format!("SELECT doc FROM {table} ORDER BY inserted_at, id"))
            .fetch_all(pool)
            .await?;

    let mut out = Vec::with_capacity(rows.len());
    for (doc,) in rows {
        match serde_json::from_value::<Transaction>(doc) {
            Ok(tx) => out.push(tx),
            Err(e) => tracing::warn!(table, error = %e, "Skipping undecodable document"),
        }
    }
    Ok(out)
}

/// Fetch both partitions concatenated, flagged first. No relative ordering
/// across partitions is implied.
pub async fn fetch_all_transactions(pool: &PgPool) -> eyre::Result<Vec<Transaction>> {
    let mut all = fetch_partition(pool, FRAUD_TABLE).await?;
    all.extend(fetch_partition(pool, LEGIT_TABLE).await?);
    Ok(all)
}

/// Row count and amount sum for one partition, aggregated in the store.
pub async fn partition_totals(pool: &PgPool, table: &str) -> eyre::Result<PartitionTotals> {
    let (count, amount_sum): (i64, Option<f64>) = sqlx::query_as(&format!(
        "SELECT COUNT(*), SUM((doc->>'Amount')::double precision) FROM {table}"
    ))
    .fetch_one(pool)
    .await?;

    Ok(PartitionTotals {
        count,
        amount_sum: amount_sum.unwrap_or(0.0),
    })
}

/// Append one record to a partition. Used only by the seed producer; the
/// relay itself never writes to the store.
pub async fn insert_transaction(pool: &PgPool, table: &str, tx: &Transaction) -> eyre::Result<()> {
    let doc = serde_json::to_value(tx)?;
    sqlx::query(&format!(
        "INSERT INTO {table} (id, doc) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING"
    ))
    .bind(&tx.id)
    .bind(&doc)
    .execute(pool)
    .await?;
    Ok(())
}
