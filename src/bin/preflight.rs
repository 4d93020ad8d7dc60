use grocery_share::infra::config::{self, Backend};
use grocery_share::{AppContext, GroceryError, Navigation};
use uuid::Uuid;

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: cargo run --bin preflight\n\
         \n\
         Reads env vars:\n\
           GROCERY_BACKEND (supabase | postgres | memory, default supabase)\n\
           SUPABASE_URL, SUPABASE_ANON_KEY   for supabase\n\
           DATABASE_URL                      for postgres\n\
           GROCERY_EMAIL, GROCERY_PASSWORD   optional sign-in\n\
           GROCERY_USER_ID                   optional local user\n"
    );
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    grocery_share::infra::logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        usage_and_exit();
    }

    // Force-read config (nice error messages if missing)
    let backend = config::backend()?;
    println!("> Preflight:");
    println!("  GROCERY_BACKEND={:?}", backend);
    match backend {
        Backend::Supabase => {
            let supabase = config::supabase()?;
            println!("  SUPABASE_URL={}", supabase.url);
        }
        Backend::Postgres => {
            config::database_url()?;
            println!("  DATABASE_URL is set");
        }
        Backend::Memory => {}
    }
    println!(
        "  credentials: {}",
        if config::credentials().is_some() { "set" } else { "not set" }
    );

    let ctx = AppContext::from_env().await?;

    // A lookup of the nil id must reach the store and come back as "not found".
    match ctx.service.get_list(Uuid::nil()).await {
        Err(GroceryError::Lookup { .. }) => println!("  Store reachable (grocery_lists readable)."),
        Ok(_) => println!("  Store reachable (unexpected row for the nil id)."),
        Err(e) => return Err(anyhow::anyhow!("Store check failed: {}", e)),
    }

    match ctx.service.auth().current_session().await {
        Ok(Some(session)) => println!("  Session active for user {}", session.user.id),
        Ok(None) => println!("  No active session (anonymous lists only)."),
        Err(e) => eprintln!("  Warning: session lookup failed: {}", e),
    }

    match ctx.router.navigate("/my-lists").await {
        Navigation::Render { .. } => println!("  /my-lists is accessible."),
        Navigation::Redirect { path, .. } => println!("  /my-lists redirects to {}", path),
        Navigation::NotFound { path } => println!("  {} is not routed", path),
    }

    println!("> Preflight OK.");
    Ok(())
}
