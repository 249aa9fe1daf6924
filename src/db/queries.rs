use chrono::{NaiveDate, NaiveDateTime, Utc};
use rusqlite::{params, Connection};

use crate::models::{
    Booking, BookingStatus, Crew, CrewMember, Event, EventMode, EventStatus, EventType,
    Organization, Role, User, UserSummary,
};

const DT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

fn fmt_dt(dt: &NaiveDateTime) -> String {
    dt.format(DT_FORMAT).to_string()
}

fn parse_dt(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, DT_FORMAT).unwrap_or_else(|_| Utc::now().naive_utc())
}

fn parse_date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap_or_else(|_| Utc::now().date_naive())
}

// ── Users ──

pub fn create_user(conn: &Connection, user: &User) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO users (id, username, email, password_hash, role, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            user.id,
            user.username,
            user.email,
            user.password_hash,
            user.role.as_str(),
            fmt_dt(&user.created_at),
            fmt_dt(&user.updated_at),
        ],
    )?;
    Ok(())
}

fn parse_user_row(row: &rusqlite::Row) -> anyhow::Result<User> {
    let role_str: String = row.get(4)?;
    let created_at_str: String = row.get(5)?;
    let updated_at_str: String = row.get(6)?;

    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        role: Role::from_str(&role_str),
        created_at: parse_dt(&created_at_str),
        updated_at: parse_dt(&updated_at_str),
    })
}

const USER_COLUMNS: &str = "id, username, email, password_hash, role, created_at, updated_at";

pub fn get_user_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<User>> {
    let result = conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
        params![id],
        |row| Ok(parse_user_row(row)),
    );

    match result {
        Ok(user) => Ok(Some(user?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_user_by_email(conn: &Connection, email: &str) -> anyhow::Result<Option<User>> {
    let result = conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
        params![email],
        |row| Ok(parse_user_row(row)),
    );

    match result {
        Ok(user) => Ok(Some(user?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_users(conn: &Connection) -> anyhow::Result<Vec<User>> {
    let mut stmt =
        conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC"))?;
    let rows = stmt.query_map([], |row| Ok(parse_user_row(row)))?;

    let mut users = vec![];
    for row in rows {
        users.push(row??);
    }
    Ok(users)
}

pub fn update_user(conn: &Connection, user: &User) -> anyhow::Result<bool> {
    let now = fmt_dt(&Utc::now().naive_utc());
    let count = conn.execute(
        "UPDATE users SET username = ?1, email = ?2, role = ?3, updated_at = ?4 WHERE id = ?5",
        params![user.username, user.email, user.role.as_str(), now, user.id],
    )?;
    Ok(count > 0)
}

pub fn update_user_role(conn: &Connection, email: &str, role: Role) -> anyhow::Result<bool> {
    let now = fmt_dt(&Utc::now().naive_utc());
    let count = conn.execute(
        "UPDATE users SET role = ?1, updated_at = ?2 WHERE email = ?3",
        params![role.as_str(), now, email],
    )?;
    Ok(count > 0)
}

pub fn update_user_password(conn: &Connection, email: &str, hash: &str) -> anyhow::Result<bool> {
    let now = fmt_dt(&Utc::now().naive_utc());
    let count = conn.execute(
        "UPDATE users SET password_hash = ?1, updated_at = ?2 WHERE email = ?3",
        params![hash, now, email],
    )?;
    Ok(count > 0)
}

pub fn delete_user(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM users WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

// ── Organizations ──

/// Organization with its president and staff advisor joined in at read time.
pub struct OrganizationRecord {
    pub organization: Organization,
    pub president: UserSummary,
    pub staff_advisor: UserSummary,
}

pub fn create_organization(conn: &Connection, org: &Organization) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO organizations (id, name, president_id, staff_advisor_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            org.id,
            org.name,
            org.president_id,
            org.staff_advisor_id,
            fmt_dt(&org.created_at),
            fmt_dt(&org.updated_at),
        ],
    )?;
    Ok(())
}

const ORGANIZATION_JOIN: &str =
    "SELECT o.id, o.name, o.president_id, o.staff_advisor_id, o.created_at, o.updated_at,
            p.username, p.email, a.username, a.email
     FROM organizations o
     INNER JOIN users p ON p.id = o.president_id
     INNER JOIN users a ON a.id = o.staff_advisor_id";

fn parse_organization_row(row: &rusqlite::Row) -> anyhow::Result<OrganizationRecord> {
    let created_at_str: String = row.get(4)?;
    let updated_at_str: String = row.get(5)?;
    let president_id: String = row.get(2)?;
    let staff_advisor_id: String = row.get(3)?;

    Ok(OrganizationRecord {
        organization: Organization {
            id: row.get(0)?,
            name: row.get(1)?,
            president_id: president_id.clone(),
            staff_advisor_id: staff_advisor_id.clone(),
            created_at: parse_dt(&created_at_str),
            updated_at: parse_dt(&updated_at_str),
        },
        president: UserSummary {
            id: president_id,
            username: row.get(6)?,
            email: row.get(7)?,
        },
        staff_advisor: UserSummary {
            id: staff_advisor_id,
            username: row.get(8)?,
            email: row.get(9)?,
        },
    })
}

pub fn get_organization(conn: &Connection, id: &str) -> anyhow::Result<Option<OrganizationRecord>> {
    let result = conn.query_row(
        &format!("{ORGANIZATION_JOIN} WHERE o.id = ?1"),
        params![id],
        |row| Ok(parse_organization_row(row)),
    );

    match result {
        Ok(org) => Ok(Some(org?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_organizations(conn: &Connection) -> anyhow::Result<Vec<OrganizationRecord>> {
    let mut stmt = conn.prepare(&format!("{ORGANIZATION_JOIN} ORDER BY o.name ASC"))?;
    let rows = stmt.query_map([], |row| Ok(parse_organization_row(row)))?;

    let mut organizations = vec![];
    for row in rows {
        organizations.push(row??);
    }
    Ok(organizations)
}

pub fn organization_name_exists(
    conn: &Connection,
    name: &str,
    exclude_id: Option<&str>,
) -> anyhow::Result<bool> {
    let count: i64 = match exclude_id {
        Some(id) => conn.query_row(
            "SELECT COUNT(*) FROM organizations WHERE name = ?1 AND id != ?2",
            params![name, id],
            |row| row.get(0),
        )?,
        None => conn.query_row(
            "SELECT COUNT(*) FROM organizations WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )?,
    };
    Ok(count > 0)
}

pub fn update_organization(conn: &Connection, org: &Organization) -> anyhow::Result<bool> {
    let now = fmt_dt(&Utc::now().naive_utc());
    let count = conn.execute(
        "UPDATE organizations SET name = ?1, president_id = ?2, staff_advisor_id = ?3, updated_at = ?4
         WHERE id = ?5",
        params![org.name, org.president_id, org.staff_advisor_id, now, org.id],
    )?;
    Ok(count > 0)
}

pub fn delete_organization(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    // Events cascade via the foreign key.
    let count = conn.execute("DELETE FROM organizations WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

// ── Events ──

const EVENT_COLUMNS: &str = "id, organization_id, name, event_date, start_time, finish_time, \
     time_period, president, proposal_path, form_path, mode, event_type, venue, status, \
     created_by, created_at, updated_at";

pub fn create_event(conn: &Connection, event: &Event) -> anyhow::Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO events ({EVENT_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)"
        ),
        params![
            event.id,
            event.organization_id,
            event.name,
            event.date.format(DATE_FORMAT).to_string(),
            event.start_time,
            event.finish_time,
            event.time_period,
            event.president,
            event.proposal_path,
            event.form_path,
            event.mode.as_str(),
            event.event_type.as_str(),
            event.venue,
            event.status.as_str(),
            event.created_by,
            fmt_dt(&event.created_at),
            fmt_dt(&event.updated_at),
        ],
    )?;
    Ok(())
}

fn parse_event_row(row: &rusqlite::Row) -> anyhow::Result<Event> {
    let date_str: String = row.get(3)?;
    let mode_str: String = row.get(10)?;
    let type_str: String = row.get(11)?;
    let status_str: String = row.get(13)?;
    let created_at_str: String = row.get(15)?;
    let updated_at_str: String = row.get(16)?;

    Ok(Event {
        id: row.get(0)?,
        organization_id: row.get(1)?,
        name: row.get(2)?,
        date: parse_date(&date_str),
        start_time: row.get(4)?,
        finish_time: row.get(5)?,
        time_period: row.get(6)?,
        president: row.get(7)?,
        proposal_path: row.get(8)?,
        form_path: row.get(9)?,
        mode: EventMode::from_str(&mode_str),
        event_type: EventType::from_str(&type_str),
        venue: row.get(12)?,
        status: EventStatus::from_str(&status_str),
        created_by: row.get(14)?,
        created_at: parse_dt(&created_at_str),
        updated_at: parse_dt(&updated_at_str),
    })
}

pub fn get_event_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<Event>> {
    let result = conn.query_row(
        &format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?1"),
        params![id],
        |row| Ok(parse_event_row(row)),
    );

    match result {
        Ok(event) => Ok(Some(event?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_events(conn: &Connection) -> anyhow::Result<Vec<Event>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {EVENT_COLUMNS} FROM events ORDER BY event_date ASC"
    ))?;
    let rows = stmt.query_map([], |row| Ok(parse_event_row(row)))?;

    let mut events = vec![];
    for row in rows {
        events.push(row??);
    }
    Ok(events)
}

pub fn list_events_for_organization(
    conn: &Connection,
    organization_id: &str,
) -> anyhow::Result<Vec<Event>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {EVENT_COLUMNS} FROM events WHERE organization_id = ?1 ORDER BY event_date ASC"
    ))?;
    let rows = stmt.query_map(params![organization_id], |row| Ok(parse_event_row(row)))?;

    let mut events = vec![];
    for row in rows {
        events.push(row??);
    }
    Ok(events)
}

/// Case-insensitive duplicate-name check within one organization.
pub fn event_name_exists(
    conn: &Connection,
    organization_id: &str,
    name: &str,
    exclude_id: Option<&str>,
) -> anyhow::Result<bool> {
    let count: i64 = match exclude_id {
        Some(id) => conn.query_row(
            "SELECT COUNT(*) FROM events
             WHERE organization_id = ?1 AND LOWER(name) = LOWER(?2) AND id != ?3",
            params![organization_id, name, id],
            |row| row.get(0),
        )?,
        None => conn.query_row(
            "SELECT COUNT(*) FROM events WHERE organization_id = ?1 AND LOWER(name) = LOWER(?2)",
            params![organization_id, name],
            |row| row.get(0),
        )?,
    };
    Ok(count > 0)
}

pub fn update_event(conn: &Connection, event: &Event) -> anyhow::Result<bool> {
    let now = fmt_dt(&Utc::now().naive_utc());
    let count = conn.execute(
        "UPDATE events SET organization_id = ?1, name = ?2, event_date = ?3, start_time = ?4,
             finish_time = ?5, time_period = ?6, president = ?7, proposal_path = ?8,
             form_path = ?9, mode = ?10, event_type = ?11, venue = ?12, updated_at = ?13
         WHERE id = ?14",
        params![
            event.organization_id,
            event.name,
            event.date.format(DATE_FORMAT).to_string(),
            event.start_time,
            event.finish_time,
            event.time_period,
            event.president,
            event.proposal_path,
            event.form_path,
            event.mode.as_str(),
            event.event_type.as_str(),
            event.venue,
            now,
            event.id,
        ],
    )?;
    Ok(count > 0)
}

pub fn update_event_status(
    conn: &Connection,
    id: &str,
    status: EventStatus,
) -> anyhow::Result<bool> {
    let now = fmt_dt(&Utc::now().naive_utc());
    let count = conn.execute(
        "UPDATE events SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status.as_str(), now, id],
    )?;
    Ok(count > 0)
}

pub fn delete_event(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM events WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

// ── Crews ──

pub fn create_crew(conn: &Connection, crew: &Crew) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO crews (id, name, description, phone, email, work_type, leader, profile_pic, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            crew.id,
            crew.name,
            crew.description,
            crew.phone,
            crew.email,
            crew.work_type,
            crew.leader,
            crew.profile_pic,
            crew.status,
        ],
    )?;
    for member in &crew.crew_members {
        add_crew_member(conn, &crew.id, member)?;
    }
    Ok(())
}

fn crew_members(conn: &Connection, crew_id: &str) -> anyhow::Result<Vec<CrewMember>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, email, phone FROM crew_members WHERE crew_id = ?1 ORDER BY rowid ASC",
    )?;
    let rows = stmt.query_map(params![crew_id], |row| {
        Ok(CrewMember {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            phone: row.get(3)?,
        })
    })?;

    let mut members = vec![];
    for row in rows {
        members.push(row?);
    }
    Ok(members)
}

fn parse_crew_row(row: &rusqlite::Row) -> rusqlite::Result<Crew> {
    Ok(Crew {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        phone: row.get(3)?,
        email: row.get(4)?,
        work_type: row.get(5)?,
        leader: row.get(6)?,
        profile_pic: row.get(7)?,
        status: row.get(8)?,
        crew_members: vec![],
    })
}

const CREW_COLUMNS: &str =
    "id, name, description, phone, email, work_type, leader, profile_pic, status";

pub fn get_crew(conn: &Connection, id: &str) -> anyhow::Result<Option<Crew>> {
    let result = conn.query_row(
        &format!("SELECT {CREW_COLUMNS} FROM crews WHERE id = ?1"),
        params![id],
        parse_crew_row,
    );

    match result {
        Ok(mut crew) => {
            crew.crew_members = crew_members(conn, &crew.id)?;
            Ok(Some(crew))
        }
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_crews(conn: &Connection) -> anyhow::Result<Vec<Crew>> {
    let mut stmt = conn.prepare(&format!("SELECT {CREW_COLUMNS} FROM crews ORDER BY name ASC"))?;
    let rows = stmt.query_map([], parse_crew_row)?;

    let mut crews = vec![];
    for row in rows {
        let mut crew = row?;
        crew.crew_members = crew_members(conn, &crew.id)?;
        crews.push(crew);
    }
    Ok(crews)
}

pub fn update_crew(conn: &Connection, crew: &Crew) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE crews SET name = ?1, description = ?2, phone = ?3, email = ?4, work_type = ?5,
             leader = ?6, profile_pic = ?7
         WHERE id = ?8",
        params![
            crew.name,
            crew.description,
            crew.phone,
            crew.email,
            crew.work_type,
            crew.leader,
            crew.profile_pic,
            crew.id,
        ],
    )?;
    Ok(count > 0)
}

pub fn update_crew_status(conn: &Connection, id: &str, status: &str) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE crews SET status = ?1 WHERE id = ?2",
        params![status, id],
    )?;
    Ok(count > 0)
}

pub fn delete_crew(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM crews WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

pub fn add_crew_member(conn: &Connection, crew_id: &str, member: &CrewMember) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO crew_members (id, crew_id, name, email, phone) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![member.id, crew_id, member.name, member.email, member.phone],
    )?;
    Ok(())
}

pub fn update_crew_member(
    conn: &Connection,
    crew_id: &str,
    member: &CrewMember,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE crew_members SET name = ?1, email = ?2, phone = ?3 WHERE id = ?4 AND crew_id = ?5",
        params![member.name, member.email, member.phone, member.id, crew_id],
    )?;
    Ok(count > 0)
}

pub fn remove_crew_member(
    conn: &Connection,
    crew_id: &str,
    member_id: &str,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "DELETE FROM crew_members WHERE id = ?1 AND crew_id = ?2",
        params![member_id, crew_id],
    )?;
    Ok(count > 0)
}

// ── Bookings ──

/// Booking with creator/modifier user summaries joined in at read time.
pub struct BookingRecord {
    pub booking: Booking,
    pub creator: Option<UserSummary>,
    pub last_modifier: Option<UserSummary>,
}

pub fn create_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO bookings (id, start_date, end_date, title, description, venue, status,
             is_blocked, created_by, last_modified_by, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            booking.id,
            fmt_dt(&booking.start_date),
            fmt_dt(&booking.end_date),
            booking.title,
            booking.description,
            booking.venue,
            booking.status.as_str(),
            booking.is_blocked as i32,
            booking.created_by,
            booking.last_modified_by,
            fmt_dt(&booking.created_at),
            fmt_dt(&booking.updated_at),
        ],
    )?;
    Ok(())
}

const BOOKING_COLUMNS: &str = "id, start_date, end_date, title, description, venue, status, \
     is_blocked, created_by, last_modified_by, created_at, updated_at";

fn parse_booking_row(row: &rusqlite::Row) -> anyhow::Result<Booking> {
    let start_date_str: String = row.get(1)?;
    let end_date_str: String = row.get(2)?;
    let status_str: String = row.get(6)?;
    let created_at_str: String = row.get(10)?;
    let updated_at_str: String = row.get(11)?;

    Ok(Booking {
        id: row.get(0)?,
        start_date: parse_dt(&start_date_str),
        end_date: parse_dt(&end_date_str),
        title: row.get(3)?,
        description: row.get(4)?,
        venue: row.get(5)?,
        status: BookingStatus::from_str(&status_str),
        is_blocked: row.get::<_, i32>(7)? != 0,
        created_by: row.get(8)?,
        last_modified_by: row.get(9)?,
        created_at: parse_dt(&created_at_str),
        updated_at: parse_dt(&updated_at_str),
    })
}

pub fn get_booking_by_id(conn: &Connection, id: &str) -> anyhow::Result<Option<Booking>> {
    let result = conn.query_row(
        &format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1"),
        params![id],
        |row| Ok(parse_booking_row(row)),
    );

    match result {
        Ok(booking) => Ok(Some(booking?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_bookings(conn: &Connection) -> anyhow::Result<Vec<BookingRecord>> {
    let mut stmt = conn.prepare(
        "SELECT b.id, b.start_date, b.end_date, b.title, b.description, b.venue, b.status,
                b.is_blocked, b.created_by, b.last_modified_by, b.created_at, b.updated_at,
                c.username, c.email, m.username, m.email
         FROM bookings b
         LEFT JOIN users c ON c.id = b.created_by
         LEFT JOIN users m ON m.id = b.last_modified_by
         ORDER BY b.start_date ASC",
    )?;

    let rows = stmt.query_map([], |row| {
        let creator_username: Option<String> = row.get(12)?;
        let creator_email: Option<String> = row.get(13)?;
        let modifier_username: Option<String> = row.get(14)?;
        let modifier_email: Option<String> = row.get(15)?;
        Ok((
            parse_booking_row(row),
            creator_username,
            creator_email,
            modifier_username,
            modifier_email,
        ))
    })?;

    let mut bookings = vec![];
    for row in rows {
        let (booking, creator_username, creator_email, modifier_username, modifier_email) = row?;
        let booking = booking?;

        let creator = creator_username.zip(creator_email).map(|(username, email)| UserSummary {
            id: booking.created_by.clone(),
            username,
            email,
        });
        let last_modifier = booking.last_modified_by.clone().and_then(|id| {
            modifier_username.zip(modifier_email).map(|(username, email)| UserSummary {
                id,
                username,
                email,
            })
        });

        bookings.push(BookingRecord {
            booking,
            creator,
            last_modifier,
        });
    }
    Ok(bookings)
}

/// Approved/blocked bookings whose range overlaps `[start, end]`, boundaries
/// inclusive. Pending and rejected bookings never count.
pub fn get_conflicting_bookings(
    conn: &Connection,
    start: &NaiveDateTime,
    end: &NaiveDateTime,
    exclude_id: Option<&str>,
) -> anyhow::Result<Vec<Booking>> {
    let start_str = fmt_dt(start);
    let end_str = fmt_dt(end);

    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings
         WHERE status IN ('approved', 'blocked')
           AND start_date <= ?1 AND end_date >= ?2
           AND id != ?3
         ORDER BY start_date ASC"
    ))?;

    let rows = stmt.query_map(params![end_str, start_str, exclude_id.unwrap_or("")], |row| {
        Ok(parse_booking_row(row))
    })?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

pub fn update_booking_status(
    conn: &Connection,
    id: &str,
    status: BookingStatus,
    modified_by: &str,
) -> anyhow::Result<bool> {
    let now = fmt_dt(&Utc::now().naive_utc());
    let count = conn.execute(
        "UPDATE bookings SET status = ?1, last_modified_by = ?2, updated_at = ?3 WHERE id = ?4",
        params![status.as_str(), modified_by, now, id],
    )?;
    Ok(count > 0)
}

pub fn delete_booking(conn: &Connection, id: &str) -> anyhow::Result<bool> {
    let count = conn.execute("DELETE FROM bookings WHERE id = ?1", params![id])?;
    Ok(count > 0)
}
