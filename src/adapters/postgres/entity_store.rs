//! PostgreSQL implementation of EntityStore.
//!
//! Single-statement operations run directly on the pool as conditional
//! `UPDATE ... RETURNING` statements. Units of work hold a
//! `sqlx::Transaction` and lock the rows they read with `FOR UPDATE`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{Connection, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::booking::{Booking, BookingStatus};
use crate::domain::circle::{Circle, CircleStatus, JoinRequest};
use crate::domain::foundation::{
    AdminId, BookingId, CircleId, ConsultantId, DomainError, ErrorCode, JoinRequestId, Money,
    PaymentId, Timestamp, UserId,
};
use crate::domain::payment::{Payment, PaymentDetails};
use crate::ports::{EntityStore, InsertOutcome, StoreTransaction};

const PAYMENT_BOOKING_UNIQUE: &str = "payments_booking_unique";
const JOIN_REQUEST_LIVE_UNIQUE: &str = "circle_join_requests_live_unique";

const BOOKING_COLUMNS: &str = "id, user_id, consultant_id, preferred_date, preferred_time, \
     status, created_at, updated_at";
const PAYMENT_COLUMNS: &str = "id, booking_id, user_id, consultant_id, amount_minor, \
     refunded_minor, method, transaction_reference, status, details, captured_at, updated_at";
const CIRCLE_COLUMNS: &str = "id, title, description, category, lead_consultant_id, \
     meeting_day, meeting_time, max_members, status, created_at";
const JOIN_REQUEST_COLUMNS: &str =
    "id, circle_id, user_id, status, requested_at, decided_at, decided_by";

/// PostgreSQL implementation of the EntityStore port.
pub struct PostgresEntityStore {
    pool: PgPool,
}

impl PostgresEntityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_error(context: &str) -> impl FnOnce(sqlx::Error) -> DomainError + '_ {
    move |e| DomainError::database(format!("Failed to {}: {}", context, e))
}

fn corrupt(field: &str, e: impl std::fmt::Display) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Invalid {} in database: {}", field, e),
    )
}

/// Maps an insert result, turning a violation of `constraint` into
/// `InsertOutcome::Duplicate`.
fn insert_outcome(
    result: Result<sqlx::postgres::PgQueryResult, sqlx::Error>,
    constraint: &str,
    context: &str,
) -> Result<InsertOutcome, DomainError> {
    match result {
        Ok(_) => Ok(InsertOutcome::Inserted),
        Err(sqlx::Error::Database(db_err))
            if db_err.is_unique_violation() && db_err.constraint() == Some(constraint) =>
        {
            Ok(InsertOutcome::Duplicate)
        }
        Err(e) => Err(db_error(context)(e)),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Row types
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    user_id: String,
    consultant_id: Option<String>,
    preferred_date: NaiveDate,
    preferred_time: NaiveTime,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = DomainError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        Ok(Booking {
            id: BookingId::from_uuid(row.id),
            user_id: UserId::new(row.user_id).map_err(|e| corrupt("user_id", e))?,
            consultant_id: row
                .consultant_id
                .map(ConsultantId::new)
                .transpose()
                .map_err(|e| corrupt("consultant_id", e))?,
            preferred_date: row.preferred_date,
            preferred_time: row.preferred_time,
            status: row.status.parse().map_err(|e| corrupt("booking status", e))?,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    booking_id: Uuid,
    user_id: String,
    consultant_id: String,
    amount_minor: i64,
    refunded_minor: i64,
    method: String,
    transaction_reference: String,
    status: String,
    details: Json<PaymentDetails>,
    captured_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = DomainError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        Ok(Payment {
            id: PaymentId::from_uuid(row.id),
            booking_id: BookingId::from_uuid(row.booking_id),
            user_id: UserId::new(row.user_id).map_err(|e| corrupt("user_id", e))?,
            consultant_id: ConsultantId::new(row.consultant_id)
                .map_err(|e| corrupt("consultant_id", e))?,
            amount: Money::from_minor(row.amount_minor).map_err(|e| corrupt("amount", e))?,
            refunded_amount: Money::from_minor(row.refunded_minor)
                .map_err(|e| corrupt("refunded amount", e))?,
            method: row.method.parse().map_err(|e| corrupt("payment method", e))?,
            transaction_reference: row.transaction_reference,
            status: row.status.parse().map_err(|e| corrupt("payment status", e))?,
            details: row.details.0,
            captured_at: Timestamp::from_datetime(row.captured_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CircleRow {
    id: Uuid,
    title: String,
    description: String,
    category: String,
    lead_consultant_id: String,
    meeting_day: String,
    meeting_time: NaiveTime,
    max_members: i32,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<CircleRow> for Circle {
    type Error = DomainError;

    fn try_from(row: CircleRow) -> Result<Self, Self::Error> {
        Ok(Circle {
            id: CircleId::from_uuid(row.id),
            title: row.title,
            description: row.description,
            category: row.category.parse().map_err(|e| corrupt("category", e))?,
            lead_consultant_id: ConsultantId::new(row.lead_consultant_id)
                .map_err(|e| corrupt("lead_consultant_id", e))?,
            meeting_day: row.meeting_day.parse().map_err(|e| corrupt("meeting_day", e))?,
            meeting_time: row.meeting_time,
            max_members: u32::try_from(row.max_members)
                .map_err(|e| corrupt("max_members", e))?,
            status: row.status.parse().map_err(|e| corrupt("circle status", e))?,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct JoinRequestRow {
    id: Uuid,
    circle_id: Uuid,
    user_id: String,
    status: String,
    requested_at: DateTime<Utc>,
    decided_at: Option<DateTime<Utc>>,
    decided_by: Option<String>,
}

impl TryFrom<JoinRequestRow> for JoinRequest {
    type Error = DomainError;

    fn try_from(row: JoinRequestRow) -> Result<Self, Self::Error> {
        Ok(JoinRequest {
            id: JoinRequestId::from_uuid(row.id),
            circle_id: CircleId::from_uuid(row.circle_id),
            user_id: UserId::new(row.user_id).map_err(|e| corrupt("user_id", e))?,
            status: row.status.parse().map_err(|e| corrupt("join request status", e))?,
            requested_at: Timestamp::from_datetime(row.requested_at),
            decided_at: row.decided_at.map(Timestamp::from_datetime),
            decided_by: row
                .decided_by
                .map(AdminId::new)
                .transpose()
                .map_err(|e| corrupt("decided_by", e))?,
        })
    }
}

fn count_to_u32(count: i64) -> Result<u32, DomainError> {
    u32::try_from(count).map_err(|e| corrupt("member count", e))
}

// ════════════════════════════════════════════════════════════════════════════
// EntityStore
// ════════════════════════════════════════════════════════════════════════════

#[async_trait]
impl EntityStore for PostgresEntityStore {
    async fn begin(&self) -> Result<Box<dyn StoreTransaction>, DomainError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("begin transaction"))?;
        Ok(Box::new(PostgresTransaction { tx }))
    }

    async fn insert_booking(&self, booking: &Booking) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO bookings (
                id, user_id, consultant_id, preferred_date, preferred_time,
                status, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(booking.id.as_uuid())
        .bind(booking.user_id.as_str())
        .bind(booking.consultant_id.as_ref().map(|c| c.as_str()))
        .bind(booking.preferred_date)
        .bind(booking.preferred_time)
        .bind(booking.status.as_str())
        .bind(booking.created_at.as_datetime())
        .bind(booking.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("insert booking"))?;

        Ok(())
    }

    async fn find_booking(&self, id: BookingId) -> Result<Option<Booking>, DomainError> {
        let row: Option<BookingRow> =
            sqlx::query_as(&format!("SELECT {} FROM bookings WHERE id = $1", BOOKING_COLUMNS))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("find booking"))?;

        row.map(Booking::try_from).transpose()
    }

    async fn list_bookings_for_user(&self, user: &UserId) -> Result<Vec<Booking>, DomainError> {
        let rows: Vec<BookingRow> = sqlx::query_as(&format!(
            "SELECT {} FROM bookings WHERE user_id = $1 ORDER BY created_at DESC",
            BOOKING_COLUMNS
        ))
        .bind(user.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("list bookings"))?;

        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn list_open_bookings_for(
        &self,
        consultant: &ConsultantId,
    ) -> Result<Vec<Booking>, DomainError> {
        let rows: Vec<BookingRow> = sqlx::query_as(&format!(
            r#"
            SELECT {} FROM bookings
            WHERE status = 'pending' AND (consultant_id IS NULL OR consultant_id = $1)
            ORDER BY preferred_date, preferred_time
            "#,
            BOOKING_COLUMNS
        ))
        .bind(consultant.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("list open bookings"))?;

        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn list_bookings_for_consultant(
        &self,
        consultant: &ConsultantId,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>, DomainError> {
        let rows: Vec<BookingRow> = sqlx::query_as(&format!(
            r#"
            SELECT {} FROM bookings
            WHERE consultant_id = $1 AND ($2::text IS NULL OR status = $2)
            ORDER BY preferred_date, preferred_time
            "#,
            BOOKING_COLUMNS
        ))
        .bind(consultant.as_str())
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("list consultant bookings"))?;

        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn list_all_bookings(
        &self,
        status: Option<BookingStatus>,
    ) -> Result<Vec<Booking>, DomainError> {
        let rows: Vec<BookingRow> = sqlx::query_as(&format!(
            r#"
            SELECT {} FROM bookings
            WHERE $1::text IS NULL OR status = $1
            ORDER BY created_at DESC
            "#,
            BOOKING_COLUMNS
        ))
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("list all bookings"))?;

        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn decide_booking(
        &self,
        id: BookingId,
        consultant: &ConsultantId,
        target: BookingStatus,
    ) -> Result<Option<Booking>, DomainError> {
        let row: Option<BookingRow> = sqlx::query_as(&format!(
            r#"
            UPDATE bookings
            SET status = $3, consultant_id = $2, updated_at = NOW()
            WHERE id = $1
              AND status = 'pending'
              AND (consultant_id IS NULL OR consultant_id = $2)
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(id.as_uuid())
        .bind(consultant.as_str())
        .bind(target.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("decide booking"))?;

        row.map(Booking::try_from).transpose()
    }

    async fn complete_booking(
        &self,
        id: BookingId,
        consultant: &ConsultantId,
    ) -> Result<Option<Booking>, DomainError> {
        let row: Option<BookingRow> = sqlx::query_as(&format!(
            r#"
            UPDATE bookings
            SET status = 'completed', updated_at = NOW()
            WHERE id = $1 AND status = 'accepted' AND consultant_id = $2
            RETURNING {}
            "#,
            BOOKING_COLUMNS
        ))
        .bind(id.as_uuid())
        .bind(consultant.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("complete booking"))?;

        row.map(Booking::try_from).transpose()
    }

    async fn find_payment_for_booking(
        &self,
        booking_id: BookingId,
    ) -> Result<Option<Payment>, DomainError> {
        let row: Option<PaymentRow> = sqlx::query_as(&format!(
            "SELECT {} FROM payments WHERE booking_id = $1",
            PAYMENT_COLUMNS
        ))
        .bind(booking_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("find payment"))?;

        row.map(Payment::try_from).transpose()
    }

    async fn insert_circle(&self, circle: &Circle) -> Result<(), DomainError> {
        let max_members =
            i32::try_from(circle.max_members).map_err(|e| corrupt("max_members", e))?;
        sqlx::query(
            r#"
            INSERT INTO circles (
                id, title, description, category, lead_consultant_id,
                meeting_day, meeting_time, max_members, status, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(circle.id.as_uuid())
        .bind(&circle.title)
        .bind(&circle.description)
        .bind(circle.category.as_str())
        .bind(circle.lead_consultant_id.as_str())
        .bind(circle.meeting_day.as_str())
        .bind(circle.meeting_time)
        .bind(max_members)
        .bind(circle.status.as_str())
        .bind(circle.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(db_error("insert circle"))?;

        Ok(())
    }

    async fn find_circle(&self, id: CircleId) -> Result<Option<Circle>, DomainError> {
        let row: Option<CircleRow> =
            sqlx::query_as(&format!("SELECT {} FROM circles WHERE id = $1", CIRCLE_COLUMNS))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_error("find circle"))?;

        row.map(Circle::try_from).transpose()
    }

    async fn update_circle_status(
        &self,
        id: CircleId,
        status: CircleStatus,
    ) -> Result<Option<Circle>, DomainError> {
        let row: Option<CircleRow> = sqlx::query_as(&format!(
            "UPDATE circles SET status = $2 WHERE id = $1 RETURNING {}",
            CIRCLE_COLUMNS
        ))
        .bind(id.as_uuid())
        .bind(status.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("update circle status"))?;

        row.map(Circle::try_from).transpose()
    }

    async fn update_circle_lead(
        &self,
        id: CircleId,
        lead: &ConsultantId,
    ) -> Result<Option<Circle>, DomainError> {
        let row: Option<CircleRow> = sqlx::query_as(&format!(
            "UPDATE circles SET lead_consultant_id = $2 WHERE id = $1 RETURNING {}",
            CIRCLE_COLUMNS
        ))
        .bind(id.as_uuid())
        .bind(lead.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("update circle lead"))?;

        row.map(Circle::try_from).transpose()
    }

    async fn count_approved_members(&self, circle_id: CircleId) -> Result<u32, DomainError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM circle_join_requests WHERE circle_id = $1 AND status = 'approved'",
        )
        .bind(circle_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("count members"))?;

        count_to_u32(count)
    }

    async fn find_join_request(
        &self,
        id: JoinRequestId,
    ) -> Result<Option<JoinRequest>, DomainError> {
        let row: Option<JoinRequestRow> = sqlx::query_as(&format!(
            "SELECT {} FROM circle_join_requests WHERE id = $1",
            JOIN_REQUEST_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("find join request"))?;

        row.map(JoinRequest::try_from).transpose()
    }

    async fn list_pending_join_requests(&self) -> Result<Vec<JoinRequest>, DomainError> {
        let rows: Vec<JoinRequestRow> = sqlx::query_as(&format!(
            "SELECT {} FROM circle_join_requests WHERE status = 'pending' ORDER BY requested_at",
            JOIN_REQUEST_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("list pending join requests"))?;

        rows.into_iter().map(JoinRequest::try_from).collect()
    }

    async fn cancel_join_request(
        &self,
        id: JoinRequestId,
        user: &UserId,
    ) -> Result<Option<JoinRequest>, DomainError> {
        let row: Option<JoinRequestRow> = sqlx::query_as(&format!(
            r#"
            UPDATE circle_join_requests SET status = 'cancelled'
            WHERE id = $1 AND user_id = $2 AND status = 'pending'
            RETURNING {}
            "#,
            JOIN_REQUEST_COLUMNS
        ))
        .bind(id.as_uuid())
        .bind(user.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("cancel join request"))?;

        row.map(JoinRequest::try_from).transpose()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// StoreTransaction
// ════════════════════════════════════════════════════════════════════════════

/// Unit of work backed by a PostgreSQL transaction. Dropping it without
/// `commit` rolls back.
pub struct PostgresTransaction {
    tx: Transaction<'static, Postgres>,
}

impl PostgresTransaction {
    async fn fetch_locked<R>(&mut self, sql: &str, id: Uuid, context: &str) -> Result<Option<R>, DomainError>
    where
        R: for<'r> sqlx::FromRow<'r, PgRow> + Send + Unpin,
    {
        sqlx::query_as::<_, R>(sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(db_error(context))
    }
}

#[async_trait]
impl StoreTransaction for PostgresTransaction {
    async fn lock_booking(&mut self, id: BookingId) -> Result<Option<Booking>, DomainError> {
        let sql = format!("SELECT {} FROM bookings WHERE id = $1 FOR UPDATE", BOOKING_COLUMNS);
        let row: Option<BookingRow> = self.fetch_locked(&sql, *id.as_uuid(), "lock booking").await?;
        row.map(Booking::try_from).transpose()
    }

    async fn transition_booking(
        &mut self,
        id: BookingId,
        from: BookingStatus,
        to: BookingStatus,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            "UPDATE bookings SET status = $3, updated_at = NOW() WHERE id = $1 AND status = $2",
        )
        .bind(id.as_uuid())
        .bind(from.as_str())
        .bind(to.as_str())
        .execute(&mut *self.tx)
        .await
        .map_err(db_error("transition booking"))?;

        Ok(result.rows_affected() == 1)
    }

    async fn find_payment_for_booking(
        &mut self,
        booking_id: BookingId,
    ) -> Result<Option<Payment>, DomainError> {
        let sql = format!(
            "SELECT {} FROM payments WHERE booking_id = $1 FOR UPDATE",
            PAYMENT_COLUMNS
        );
        let row: Option<PaymentRow> = self
            .fetch_locked(&sql, *booking_id.as_uuid(), "lock payment")
            .await?;
        row.map(Payment::try_from).transpose()
    }

    async fn insert_payment(&mut self, payment: &Payment) -> Result<InsertOutcome, DomainError> {
        // Savepoint so a duplicate does not abort the surrounding transaction.
        let mut savepoint = self
            .tx
            .begin()
            .await
            .map_err(db_error("open savepoint"))?;
        let result = sqlx::query(
            r#"
            INSERT INTO payments (
                id, booking_id, user_id, consultant_id, amount_minor, refunded_minor,
                method, transaction_reference, status, details, captured_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(payment.id.as_uuid())
        .bind(payment.booking_id.as_uuid())
        .bind(payment.user_id.as_str())
        .bind(payment.consultant_id.as_str())
        .bind(payment.amount.as_minor())
        .bind(payment.refunded_amount.as_minor())
        .bind(payment.method.as_str())
        .bind(&payment.transaction_reference)
        .bind(payment.status.as_str())
        .bind(Json(&payment.details))
        .bind(payment.captured_at.as_datetime())
        .bind(payment.updated_at.as_datetime())
        .execute(&mut *savepoint)
        .await;

        let outcome = insert_outcome(result, PAYMENT_BOOKING_UNIQUE, "insert payment")?;
        if outcome == InsertOutcome::Inserted {
            savepoint
                .commit()
                .await
                .map_err(db_error("release savepoint"))?;
        }
        Ok(outcome)
    }

    async fn record_refund(&mut self, payment: &Payment) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE payments
            SET status = $2, refunded_minor = $3, details = $4, updated_at = $5
            WHERE id = $1 AND status = 'completed'
            "#,
        )
        .bind(payment.id.as_uuid())
        .bind(payment.status.as_str())
        .bind(payment.refunded_amount.as_minor())
        .bind(Json(&payment.details))
        .bind(payment.updated_at.as_datetime())
        .execute(&mut *self.tx)
        .await
        .map_err(db_error("record refund"))?;

        Ok(result.rows_affected() == 1)
    }

    async fn lock_circle(&mut self, id: CircleId) -> Result<Option<Circle>, DomainError> {
        let sql = format!("SELECT {} FROM circles WHERE id = $1 FOR UPDATE", CIRCLE_COLUMNS);
        let row: Option<CircleRow> = self.fetch_locked(&sql, *id.as_uuid(), "lock circle").await?;
        row.map(Circle::try_from).transpose()
    }

    async fn count_approved_members(&mut self, circle_id: CircleId) -> Result<u32, DomainError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM circle_join_requests WHERE circle_id = $1 AND status = 'approved'",
        )
        .bind(circle_id.as_uuid())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(db_error("count members"))?;

        count_to_u32(count)
    }

    async fn insert_join_request(
        &mut self,
        request: &JoinRequest,
    ) -> Result<InsertOutcome, DomainError> {
        let mut savepoint = self
            .tx
            .begin()
            .await
            .map_err(db_error("open savepoint"))?;
        let result = sqlx::query(
            r#"
            INSERT INTO circle_join_requests (
                id, circle_id, user_id, status, requested_at, decided_at, decided_by
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(request.id.as_uuid())
        .bind(request.circle_id.as_uuid())
        .bind(request.user_id.as_str())
        .bind(request.status.as_str())
        .bind(request.requested_at.as_datetime())
        .bind(request.decided_at.as_ref().map(|t| *t.as_datetime()))
        .bind(request.decided_by.as_ref().map(|a| a.as_str()))
        .execute(&mut *savepoint)
        .await;

        let outcome = insert_outcome(result, JOIN_REQUEST_LIVE_UNIQUE, "insert join request")?;
        if outcome == InsertOutcome::Inserted {
            savepoint
                .commit()
                .await
                .map_err(db_error("release savepoint"))?;
        }
        Ok(outcome)
    }

    async fn lock_join_request(
        &mut self,
        id: JoinRequestId,
    ) -> Result<Option<JoinRequest>, DomainError> {
        let sql = format!(
            "SELECT {} FROM circle_join_requests WHERE id = $1 FOR UPDATE",
            JOIN_REQUEST_COLUMNS
        );
        let row: Option<JoinRequestRow> = self
            .fetch_locked(&sql, *id.as_uuid(), "lock join request")
            .await?;
        row.map(JoinRequest::try_from).transpose()
    }

    async fn record_decision(&mut self, request: &JoinRequest) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE circle_join_requests
            SET status = $2, decided_at = $3, decided_by = $4
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(request.id.as_uuid())
        .bind(request.status.as_str())
        .bind(request.decided_at.as_ref().map(|t| *t.as_datetime()))
        .bind(request.decided_by.as_ref().map(|a| a.as_str()))
        .execute(&mut *self.tx)
        .await
        .map_err(db_error("record decision"))?;

        Ok(result.rows_affected() == 1)
    }

    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        self.tx
            .commit()
            .await
            .map_err(db_error("commit transaction"))
    }
}
