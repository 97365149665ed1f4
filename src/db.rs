use anyhow::Context;
use sqlx::MySqlPool;
use tracing::info;

use crate::auth::password::hash_password;

pub async fn init_db(database_url: &str) -> anyhow::Result<MySqlPool> {
    let pool = MySqlPool::connect(database_url)
        .await
        .context("Failed to connect to database")?;

    create_tables(&pool).await?;
    seed_sample_users(&pool).await?;

    Ok(pool)
}

async fn create_tables(pool: &MySqlPool) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id BIGINT UNSIGNED AUTO_INCREMENT PRIMARY KEY,
            employee_id VARCHAR(50) NOT NULL UNIQUE,
            name VARCHAR(100) NOT NULL,
            email VARCHAR(100) NOT NULL UNIQUE,
            hashed_password VARCHAR(255) NOT NULL,
            role VARCHAR(20) NOT NULL DEFAULT 'EMPLOYEE',
            department VARCHAR(100) NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create users table")?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS refresh_tokens (
            id BIGINT UNSIGNED AUTO_INCREMENT PRIMARY KEY,
            user_id BIGINT UNSIGNED NOT NULL,
            jti CHAR(36) NOT NULL UNIQUE,
            revoked BOOLEAN NOT NULL DEFAULT FALSE,
            expires_at TIMESTAMP NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create refresh_tokens table")?;

    // the two composite indexes back the overlap check and the expiry sweep
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS leave_requests (
            id CHAR(36) PRIMARY KEY,
            employee_id VARCHAR(50) NOT NULL,
            leave_type VARCHAR(10) NOT NULL,
            start_date DATE NOT NULL,
            end_date DATE NOT NULL,
            reason TEXT NULL,
            status VARCHAR(10) NOT NULL DEFAULT 'PENDING',
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            INDEX idx_employee_status (employee_id, status, start_date, end_date),
            INDEX idx_status_created (status, created_at)
        )
        "#,
    )
    .execute(pool)
    .await
    .context("Failed to create leave_requests table")?;

    Ok(())
}

/// First-run convenience accounts, matching the documented demo credentials.
async fn seed_sample_users(pool: &MySqlPool) -> anyhow::Result<()> {
    let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await
        .context("Failed to count users")?;
    if existing > 0 {
        return Ok(());
    }

    let samples = [
        (
            "EMP001",
            "John Doe",
            "john.doe@example.com",
            "password123",
            "EMPLOYEE",
            Some("Engineering"),
        ),
        (
            "EMP002",
            "Jane Smith",
            "jane.smith@example.com",
            "password123",
            "EMPLOYEE",
            Some("Marketing"),
        ),
        (
            "ADMIN001",
            "Admin User",
            "admin@example.com",
            "admin123",
            "ADMIN",
            Some("HR"),
        ),
    ];

    for (employee_id, name, email, password, role, department) in samples {
        sqlx::query(
            r#"
            INSERT INTO users (employee_id, name, email, hashed_password, role, department)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(employee_id)
        .bind(name)
        .bind(email)
        .bind(hash_password(password))
        .bind(role)
        .bind(department)
        .execute(pool)
        .await
        .context("Failed to seed sample users")?;
    }

    info!("Sample users created (2 employees, 1 admin)");
    Ok(())
}
