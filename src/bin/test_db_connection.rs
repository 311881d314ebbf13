use learning_proxy::config::AppConfig;
use learning_proxy::db;

/// Checks the database the proxy will verify tokens against.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    config.validate()?;

    println!(
        "Connecting to database {}:{}/{}...",
        config.database.host, config.database.port, config.database.name
    );
    let pool = db::create_pool(&config.database)?;

    if !db::test_connection(&pool).await {
        println!("❌ Database is not reachable");
        std::process::exit(1);
    }
    println!("✅ Database connection OK");

    // The proxy depends on these SQL functions.
    let required = ["verify_token", "verify_login", "get_lessons_for_user", "get_lesson_by_id"];
    let found = sqlx::query_as::<_, (String,)>(
        "SELECT DISTINCT proname::text FROM pg_proc WHERE proname = ANY($1)",
    )
    .bind(&required[..])
    .fetch_all(&pool)
    .await?;

    let mut missing = 0;
    for name in required {
        if found.iter().any(|(f,)| f == name) {
            println!("  ✅ {}()", name);
        } else {
            println!("  ❌ {}() NOT FOUND", name);
            missing += 1;
        }
    }

    // An unknown token must come back as zero rows, not an error.
    let probe = sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM verify_token($1)")
        .bind("connection-check")
        .fetch_one(&pool)
        .await;
    match probe {
        Ok((0,)) => println!("✅ verify_token() rejects unknown tokens"),
        Ok((rows,)) => println!("❌ verify_token() returned {} rows for an unknown token", rows),
        Err(e) => println!("❌ Could not call verify_token(): {}", e),
    }

    if missing > 0 {
        std::process::exit(1);
    }
    Ok(())
}
