use async_trait::async_trait;
use sqlx::SqlitePool;

use super::{connection, ImportStore};
use crate::domain::error::{AppError, Result};
use crate::domain::import::{
    DonorFields, DonorRef, OrgScope, PledgeFields, PledgeRef, YahrzeitFields, YahrzeitRef,
};

/// `ImportStore` backed by the donors/pledges/yahrzeits tables
#[derive(Clone)]
pub struct SqliteImportStore {
    pool: SqlitePool,
}

impl SqliteImportStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = connection::connect(database_url).await?;
        Ok(Self { pool })
    }

    pub async fn in_memory() -> Result<Self> {
        let pool = connection::connect_in_memory().await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a reference to the connection pool for direct queries
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn count_donors(&self, scope: &OrgScope) -> Result<i64> {
        self.count("donors", scope).await
    }

    pub async fn count_pledges(&self, scope: &OrgScope) -> Result<i64> {
        self.count("pledges", scope).await
    }

    pub async fn count_yahrzeits(&self, scope: &OrgScope) -> Result<i64> {
        self.count("yahrzeits", scope).await
    }

    async fn count(&self, table: &str, scope: &OrgScope) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {} WHERE organization_id = ?", table);
        sqlx::query_scalar::<_, i64>(&sql)
            .bind(scope.organization_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_db_error(e, "Failed to count rows"))
    }
}

#[async_trait]
impl ImportStore for SqliteImportStore {
    async fn find_donor_by_normalized_phone(
        &self,
        scope: &OrgScope,
        phone: &str,
    ) -> Result<Option<DonorRef>> {
        let donor = sqlx::query_as::<_, DonorEntity>(
            "SELECT id, organization_id, phone, normalized_phone, first_name, last_name,
                    display_name, email, address_city, notes
             FROM donors WHERE organization_id = ? AND normalized_phone = ?",
        )
        .bind(scope.organization_id)
        .bind(phone)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Failed to look up donor"))?;

        Ok(donor.map(Into::into))
    }

    async fn find_donor_by_id(&self, scope: &OrgScope, id: i64) -> Result<Option<DonorRef>> {
        let donor = sqlx::query_as::<_, DonorEntity>(
            "SELECT id, organization_id, phone, normalized_phone, first_name, last_name,
                    display_name, email, address_city, notes
             FROM donors WHERE organization_id = ? AND id = ?",
        )
        .bind(scope.organization_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Failed to load donor"))?;

        Ok(donor.map(Into::into))
    }

    async fn insert_donor(&self, scope: &OrgScope, fields: &DonorFields) -> Result<DonorRef> {
        let result = sqlx::query(
            "INSERT INTO donors (organization_id, phone, normalized_phone, first_name, last_name,
                                 display_name, email, address_city, notes)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(scope.organization_id)
        .bind(&fields.phone)
        .bind(&fields.normalized_phone)
        .bind(&fields.first_name)
        .bind(&fields.last_name)
        .bind(&fields.display_name)
        .bind(&fields.email)
        .bind(&fields.address_city)
        .bind(&fields.notes)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Failed to insert donor"))?;

        Ok(DonorRef {
            id: result.last_insert_rowid(),
            organization_id: scope.organization_id,
            fields: fields.clone(),
        })
    }

    async fn merge_donor(
        &self,
        scope: &OrgScope,
        existing: &DonorRef,
        fields: &DonorFields,
    ) -> Result<DonorRef> {
        let result = sqlx::query(
            "UPDATE donors SET first_name = ?, last_name = ?, display_name = ?, email = ?,
                               address_city = ?, notes = ?, updated_at = CURRENT_TIMESTAMP
             WHERE id = ? AND organization_id = ?",
        )
        .bind(&fields.first_name)
        .bind(&fields.last_name)
        .bind(&fields.display_name)
        .bind(&fields.email)
        .bind(&fields.address_city)
        .bind(&fields.notes)
        .bind(existing.id)
        .bind(scope.organization_id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Failed to merge donor"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Donor not found: {}", existing.id)));
        }

        Ok(DonorRef {
            id: existing.id,
            organization_id: scope.organization_id,
            fields: DonorFields {
                phone: existing.fields.phone.clone(),
                normalized_phone: existing.fields.normalized_phone.clone(),
                ..fields.clone()
            },
        })
    }

    async fn insert_pledge(&self, scope: &OrgScope, fields: &PledgeFields) -> Result<PledgeRef> {
        let result = sqlx::query(
            "INSERT INTO pledges (organization_id, donor_id, total_amount, start_date, frequency, notes)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(scope.organization_id)
        .bind(fields.donor_id)
        .bind(fields.total_amount.to_string())
        .bind(fields.start_date.map(|d| d.format("%Y-%m-%d").to_string()))
        .bind(fields.frequency.map(|f| f.as_str()))
        .bind(&fields.notes)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Failed to insert pledge"))?;

        Ok(PledgeRef {
            id: result.last_insert_rowid(),
            donor_id: fields.donor_id,
        })
    }

    async fn insert_yahrzeit(
        &self,
        scope: &OrgScope,
        fields: &YahrzeitFields,
    ) -> Result<YahrzeitRef> {
        let result = sqlx::query(
            "INSERT INTO yahrzeits (organization_id, donor_id, deceased_name, hebrew_date, secular_date,
                                    relationship, notes, contact_email, contact_phone)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(scope.organization_id)
        .bind(fields.donor_id)
        .bind(&fields.deceased_name)
        .bind(&fields.hebrew_date)
        .bind(fields.secular_date.format("%Y-%m-%d").to_string())
        .bind(&fields.relationship)
        .bind(&fields.notes)
        .bind(&fields.contact_email)
        .bind(&fields.contact_phone)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Failed to insert yahrzeit"))?;

        Ok(YahrzeitRef {
            id: result.last_insert_rowid(),
            donor_id: fields.donor_id,
        })
    }
}

/// Connectivity failures stay fatal; everything else is reported against the row
fn map_db_error(err: sqlx::Error, context: &str) -> AppError {
    match AppError::from(err) {
        AppError::StorageUnavailable(msg) => {
            AppError::StorageUnavailable(format!("{}: {}", context, msg))
        }
        AppError::DatabaseError(msg) => AppError::DatabaseError(format!("{}: {}", context, msg)),
        other => other,
    }
}

// Internal entity for database mapping
#[derive(sqlx::FromRow)]
struct DonorEntity {
    id: i64,
    organization_id: i64,
    phone: String,
    normalized_phone: String,
    first_name: Option<String>,
    last_name: Option<String>,
    display_name: Option<String>,
    email: Option<String>,
    address_city: Option<String>,
    notes: Option<String>,
}

impl From<DonorEntity> for DonorRef {
    fn from(e: DonorEntity) -> Self {
        Self {
            id: e.id,
            organization_id: e.organization_id,
            fields: DonorFields {
                phone: e.phone,
                normalized_phone: e.normalized_phone,
                first_name: e.first_name,
                last_name: e.last_name,
                display_name: e.display_name,
                email: e.email,
                address_city: e.address_city,
                notes: e.notes,
            },
        }
    }
}
