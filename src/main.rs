//! `grocery`: command-line front-end over the grocery service and router.

use anyhow::{anyhow, Context};
use chrono::NaiveDate;
use grocery_share::{AppContext, GroceryItem, GroceryList, Navigation, NewItem};
use uuid::Uuid;

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: grocery <command> [args]\n\
         \n\
         Commands:\n\
           create-list <name> [--date YYYY-MM-DD] [--store STORE]\n\
           add-item <list_id> <name> <quantity> <category> [--comment TEXT]\n\
           show <list_id>\n\
           lists\n\
           purchased <item_id> <true|false>\n\
           reply <item_id> <text>\n\
           open <path>\n\
         \n\
         Backend and credentials come from the environment (see `preflight --help`).\n"
    );
    std::process::exit(2);
}

/// Removes `--name value` from `args` and returns the value.
fn take_flag(args: &mut Vec<String>, name: &str) -> anyhow::Result<Option<String>> {
    let Some(pos) = args.iter().position(|a| a == name) else {
        return Ok(None);
    };
    if pos + 1 >= args.len() {
        return Err(anyhow!("{} needs a value", name));
    }
    let value = args.remove(pos + 1);
    args.remove(pos);
    Ok(Some(value))
}

fn parse_id(s: &str) -> anyhow::Result<Uuid> {
    Uuid::parse_str(s).with_context(|| format!("'{}' is not a valid id", s))
}

fn print_list(list: &GroceryList) {
    let mut line = format!("{}  {}", list.id, list.name);
    if let Some(date) = list.purchase_date {
        line.push_str(&format!("  (buy on {})", date));
    }
    if let Some(store) = &list.store {
        line.push_str(&format!("  @ {}", store));
    }
    if list.is_anonymous() {
        line.push_str("  [anonymous]");
    }
    println!("{}", line);
}

fn print_item(item: &GroceryItem) {
    let mark = if item.purchased { "x" } else { " " };
    let mut line = format!(
        "  [{}] {}  {} x {}  ({})",
        mark, item.id, item.quantity, item.name, item.category
    );
    if let Some(comment) = &item.comment {
        line.push_str(&format!("  // {}", comment));
    }
    if let Some(reply) = &item.reply {
        line.push_str(&format!("  -> {}", reply));
    }
    println!("{}", line);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    grocery_share::infra::logging::init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() || args.iter().any(|a| a == "-h" || a == "--help") {
        usage_and_exit();
    }
    let command = args.remove(0);

    let ctx = AppContext::from_env().await?;
    let service = &ctx.service;

    match command.as_str() {
        "create-list" => {
            let date = take_flag(&mut args, "--date")?
                .map(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d"))
                .transpose()
                .context("--date must be YYYY-MM-DD")?;
            let store = take_flag(&mut args, "--store")?;
            let [name] = args.as_slice() else { usage_and_exit() };
            let list = service.create_list(name, date, store.as_deref()).await?;
            print_list(&list);
        }
        "add-item" => {
            let comment = take_flag(&mut args, "--comment")?;
            let [list_id, name, quantity, category] = args.as_slice() else {
                usage_and_exit()
            };
            let quantity: f64 = quantity
                .parse()
                .with_context(|| format!("'{}' is not a number", quantity))?;
            let mut item = NewItem::new(name.as_str(), quantity, category.as_str());
            item.comment = comment;
            let added = service.add_items(parse_id(list_id)?, &[item]).await?;
            added.iter().for_each(print_item);
        }
        "show" => {
            let [list_id] = args.as_slice() else { usage_and_exit() };
            let loaded = service.get_list(parse_id(list_id)?).await?;
            print_list(&loaded.list);
            loaded.items.iter().for_each(print_item);
        }
        "lists" => {
            for list in service.get_all_lists().await? {
                print_list(&list);
            }
        }
        "purchased" => {
            let [item_id, flag] = args.as_slice() else { usage_and_exit() };
            let purchased: bool = flag
                .parse()
                .with_context(|| format!("'{}' is not true/false", flag))?;
            service
                .update_item_purchased(parse_id(item_id)?, purchased)
                .await?;
            println!("ok");
        }
        "reply" => {
            if args.len() < 2 {
                usage_and_exit();
            }
            let item_id = parse_id(&args[0])?;
            let reply = args[1..].join(" ");
            service.add_item_reply(item_id, &reply).await?;
            println!("ok");
        }
        "open" => {
            let [path] = args.as_slice() else { usage_and_exit() };
            match ctx.router.navigate(path).await {
                Navigation::Render { route, params } => {
                    println!("render {} ({:?}) {:?}", route.name, route.view, params);
                }
                Navigation::Redirect {
                    to,
                    path,
                    redirect_from,
                } => {
                    println!("redirect to {} ({}) from {}", to, path, redirect_from);
                }
                Navigation::NotFound { path } => {
                    println!("not found: {}", path);
                }
            }
        }
        _ => usage_and_exit(),
    }

    Ok(())
}
