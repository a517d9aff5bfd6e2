use anyhow::Context;
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::{Booking, BookingStatus, Location, Rating, ServiceCategory, ServiceKind};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

const BOOKING_COLUMNS: &str = "id, customer_id, provider_id, service_category_id, \
     pickup_latitude, pickup_longitude, pickup_address, \
     dropoff_latitude, dropoff_longitude, dropoff_address, \
     special_instructions, scheduled_time, estimated_price, final_price, distance_km, \
     status, created_at, started_at, completed_at, updated_at";

pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(s: &str) -> anyhow::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .with_context(|| format!("invalid timestamp in store: {s}"))
}

fn parse_optional_timestamp(s: Option<String>) -> anyhow::Result<Option<NaiveDateTime>> {
    s.as_deref().map(parse_timestamp).transpose()
}

// ── Service Categories ──

pub fn get_service_category(
    conn: &Connection,
    id: &str,
) -> anyhow::Result<Option<ServiceCategory>> {
    let row = conn
        .query_row(
            "SELECT id, name, kind, description, base_price, price_per_km, is_active
             FROM service_categories WHERE id = ?1",
            params![id],
            |row| Ok(parse_category_row(row)),
        )
        .optional()?;

    row.transpose()
}

pub fn list_active_service_categories(conn: &Connection) -> anyhow::Result<Vec<ServiceCategory>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, kind, description, base_price, price_per_km, is_active
         FROM service_categories WHERE is_active = 1 ORDER BY name ASC",
    )?;

    let rows = stmt.query_map([], |row| Ok(parse_category_row(row)))?;

    let mut categories = vec![];
    for row in rows {
        categories.push(row??);
    }
    Ok(categories)
}

pub fn save_service_category(conn: &Connection, category: &ServiceCategory) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO service_categories (id, name, kind, description, base_price, price_per_km, is_active)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(id) DO UPDATE SET
           name = excluded.name,
           kind = excluded.kind,
           description = excluded.description,
           base_price = excluded.base_price,
           price_per_km = excluded.price_per_km,
           is_active = excluded.is_active",
        params![
            category.id,
            category.name,
            category.kind.as_str(),
            category.description,
            category.base_price,
            category.price_per_km,
            category.is_active as i32,
        ],
    )?;
    Ok(())
}

fn parse_category_row(row: &rusqlite::Row) -> anyhow::Result<ServiceCategory> {
    let kind_str: String = row.get(2)?;
    let kind = ServiceKind::parse(&kind_str)
        .with_context(|| format!("unknown service kind in store: {kind_str}"))?;

    Ok(ServiceCategory {
        id: row.get(0)?,
        name: row.get(1)?,
        kind,
        description: row.get(3)?,
        base_price: row.get(4)?,
        price_per_km: row.get(5)?,
        is_active: row.get::<_, i32>(6)? != 0,
    })
}

// ── Bookings ──

pub fn create_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<()> {
    let dropoff = booking.dropoff.as_ref();

    conn.execute(
        &format!(
            "INSERT INTO bookings ({BOOKING_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)"
        ),
        params![
            booking.id,
            booking.customer_id,
            booking.provider_id,
            booking.service_category_id,
            booking.pickup.latitude,
            booking.pickup.longitude,
            booking.pickup.address,
            dropoff.map(|d| d.latitude),
            dropoff.map(|d| d.longitude),
            dropoff.map(|d| d.address.as_str()),
            booking.special_instructions,
            booking.scheduled_time.as_ref().map(format_timestamp),
            booking.estimated_price,
            booking.final_price,
            booking.distance_km,
            booking.status.as_str(),
            format_timestamp(&booking.created_at),
            booking.started_at.as_ref().map(format_timestamp),
            booking.completed_at.as_ref().map(format_timestamp),
            format_timestamp(&booking.updated_at),
        ],
    )?;
    Ok(())
}

pub fn get_booking_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<Booking>> {
    let row = conn
        .query_row(
            &format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1"),
            params![id],
            |row| Ok(parse_booking_row(row)),
        )
        .optional()?;

    row.transpose()
}

/// Pending, unassigned bookings, oldest first.
pub fn list_available_bookings(
    conn: &Connection,
    limit: i64,
    service_category_id: Option<&str>,
) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings
         WHERE status = 'pending' AND provider_id IS NULL
           AND (?1 IS NULL OR service_category_id = ?1)
         ORDER BY created_at ASC, rowid ASC
         LIMIT ?2"
    ))?;

    let rows = stmt.query_map(params![service_category_id, limit], |row| {
        Ok(parse_booking_row(row))
    })?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

pub fn get_bookings_for_customer(
    conn: &Connection,
    customer_id: &str,
) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE customer_id = ?1
         ORDER BY created_at DESC, rowid DESC"
    ))?;

    let rows = stmt.query_map(params![customer_id], |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

pub fn get_bookings_for_provider(
    conn: &Connection,
    provider_id: &str,
) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE provider_id = ?1
         ORDER BY created_at DESC, rowid DESC"
    ))?;

    let rows = stmt.query_map(params![provider_id], |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

// Every transition below is a single conditional UPDATE. The returned flag is whether a
// row matched; `false` means the booking was not in the expected state at write time.

pub fn claim_booking(
    conn: &Connection,
    id: &str,
    provider_id: &str,
    now: &NaiveDateTime,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET status = 'accepted', provider_id = ?1, updated_at = ?2
         WHERE id = ?3 AND status = 'pending' AND provider_id IS NULL",
        params![provider_id, format_timestamp(now), id],
    )?;
    Ok(count > 0)
}

pub fn start_booking(conn: &Connection, id: &str, now: &NaiveDateTime) -> anyhow::Result<bool> {
    let now = format_timestamp(now);
    let count = conn.execute(
        "UPDATE bookings SET status = 'in_progress', started_at = ?1, updated_at = ?1
         WHERE id = ?2 AND status = 'accepted'",
        params![now, id],
    )?;
    Ok(count > 0)
}

pub fn complete_booking(
    conn: &Connection,
    id: &str,
    final_price: f64,
    now: &NaiveDateTime,
) -> anyhow::Result<bool> {
    let now = format_timestamp(now);
    let count = conn.execute(
        "UPDATE bookings SET status = 'completed', final_price = ?1, completed_at = ?2, updated_at = ?2
         WHERE id = ?3 AND status = 'in_progress'",
        params![final_price, now, id],
    )?;
    Ok(count > 0)
}

pub fn cancel_booking(
    conn: &Connection,
    id: &str,
    expected: BookingStatus,
    now: &NaiveDateTime,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET status = 'cancelled', updated_at = ?1
         WHERE id = ?2 AND status = ?3",
        params![format_timestamp(now), id, expected.as_str()],
    )?;
    Ok(count > 0)
}

/// `(final_price, completed_at)` for every completed booking of a provider.
pub fn get_completed_payouts(
    conn: &Connection,
    provider_id: &str,
) -> anyhow::Result<Vec<(f64, NaiveDateTime)>> {
    let mut stmt = conn.prepare(
        "SELECT final_price, completed_at FROM bookings
         WHERE provider_id = ?1 AND status = 'completed'
         ORDER BY completed_at ASC",
    )?;

    let rows = stmt.query_map(params![provider_id], |row| {
        let price: f64 = row.get(0)?;
        let completed_at: String = row.get(1)?;
        Ok((price, completed_at))
    })?;

    let mut payouts = vec![];
    for row in rows {
        let (price, completed_at) = row?;
        payouts.push((price, parse_timestamp(&completed_at)?));
    }
    Ok(payouts)
}

fn parse_booking_row(row: &rusqlite::Row) -> anyhow::Result<Booking> {
    let dropoff_latitude: Option<f64> = row.get(7)?;
    let dropoff_longitude: Option<f64> = row.get(8)?;
    let dropoff_address: Option<String> = row.get(9)?;
    let dropoff = match (dropoff_latitude, dropoff_longitude, dropoff_address) {
        (Some(latitude), Some(longitude), Some(address)) => Some(Location {
            latitude,
            longitude,
            address,
        }),
        (None, None, None) => None,
        _ => anyhow::bail!("booking has a partial dropoff"),
    };

    let status_str: String = row.get(15)?;
    let status = BookingStatus::parse(&status_str)
        .with_context(|| format!("unknown booking status in store: {status_str}"))?;

    let created_at: String = row.get(16)?;
    let updated_at: String = row.get(19)?;

    Ok(Booking {
        id: row.get(0)?,
        customer_id: row.get(1)?,
        provider_id: row.get(2)?,
        service_category_id: row.get(3)?,
        pickup: Location {
            latitude: row.get(4)?,
            longitude: row.get(5)?,
            address: row.get(6)?,
        },
        dropoff,
        special_instructions: row.get(10)?,
        scheduled_time: parse_optional_timestamp(row.get(11)?)?,
        estimated_price: row.get(12)?,
        final_price: row.get(13)?,
        distance_km: row.get(14)?,
        status,
        created_at: parse_timestamp(&created_at)?,
        started_at: parse_optional_timestamp(row.get(17)?)?,
        completed_at: parse_optional_timestamp(row.get(18)?)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

// ── Ratings ──

/// Inserts a rating. Returns `false` when the rater already rated this booking.
pub fn insert_rating(conn: &Connection, rating: &Rating) -> anyhow::Result<bool> {
    let result = conn.execute(
        "INSERT INTO ratings (id, booking_id, rated_by, rated_user, score, review, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            rating.id,
            rating.booking_id,
            rating.rater_id,
            rating.rated_user_id,
            rating.score,
            rating.review,
            format_timestamp(&rating.created_at),
        ],
    );

    match result {
        Ok(_) => Ok(true),
        Err(rusqlite::Error::SqliteFailure(e, _))
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

pub fn get_ratings_for_booking(conn: &Connection, booking_id: &str) -> anyhow::Result<Vec<Rating>> {
    let mut stmt = conn.prepare(
        "SELECT id, booking_id, rated_by, rated_user, score, review, created_at
         FROM ratings WHERE booking_id = ?1 ORDER BY created_at ASC",
    )?;

    let rows = stmt.query_map(params![booking_id], |row| Ok(parse_rating_row(row)))?;

    let mut ratings = vec![];
    for row in rows {
        ratings.push(row??);
    }
    Ok(ratings)
}

fn parse_rating_row(row: &rusqlite::Row) -> anyhow::Result<Rating> {
    let created_at: String = row.get(6)?;

    Ok(Rating {
        id: row.get(0)?,
        booking_id: row.get(1)?,
        rater_id: row.get(2)?,
        rated_user_id: row.get(3)?,
        score: row.get(4)?,
        review: row.get(5)?,
        created_at: parse_timestamp(&created_at)?,
    })
}

/// `(AVG(score), COUNT(*))` over ratings received by `user_id`.
pub fn get_rating_stats(conn: &Connection, user_id: &str) -> anyhow::Result<(Option<f64>, i64)> {
    let stats = conn.query_row(
        "SELECT AVG(score), COUNT(*) FROM ratings WHERE rated_user = ?1",
        params![user_id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    Ok(stats)
}
