//! Line commands typed at the storefront prompt.

use client_core::CloseReason;
use shared::domain::CartItemId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Open(String),
    Show,
    Increment,
    Decrement,
    Quantity(String),
    Cutlery,
    Add,
    Close(CloseReason),
    Remove(CartItemId),
    Clear,
    Help,
    Quit,
}

pub const HELP: &str = "\
list                 show the catalog
open <n|id>          open a product
show                 show the open product
+ / -                step the quantity
qty <value>          type a quantity
cutlery              toggle cutlery
add                  add the open product to the cart
close | esc | away   dismiss the product (control, Escape, backdrop)
remove <item id>     remove a cart line
clear                empty the cart
quit";

pub fn parse(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    let command = match word {
        "list" | "ls" => Command::List,
        "open" if !rest.is_empty() => Command::Open(rest.to_string()),
        "open" => return Err("usage: open <n|id>".to_string()),
        "show" => Command::Show,
        "+" => Command::Increment,
        "-" => Command::Decrement,
        "qty" => Command::Quantity(rest.to_string()),
        "cutlery" => Command::Cutlery,
        "add" => Command::Add,
        "close" => Command::Close(CloseReason::CloseControl),
        "esc" => Command::Close(CloseReason::Escape),
        "away" => Command::Close(CloseReason::Backdrop),
        "remove" => {
            let item_id = rest
                .parse::<i64>()
                .map_err(|_| "usage: remove <item id>".to_string())?;
            Command::Remove(CartItemId(item_id))
        }
        "clear" => Command::Clear,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command '{other}'; type 'help'")),
    };
    Ok(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_close_variants() {
        assert_eq!(parse("esc"), Ok(Command::Close(CloseReason::Escape)));
        assert_eq!(parse("away"), Ok(Command::Close(CloseReason::Backdrop)));
        assert_eq!(parse(" close "), Ok(Command::Close(CloseReason::CloseControl)));
    }

    #[test]
    fn quantity_text_is_passed_through_raw() {
        assert_eq!(parse("qty abc"), Ok(Command::Quantity("abc".to_string())));
        assert_eq!(parse("qty"), Ok(Command::Quantity(String::new())));
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(parse("open").is_err());
        assert!(parse("remove x").is_err());
        assert!(parse("dance").is_err());
        assert_eq!(parse("remove 4"), Ok(Command::Remove(CartItemId(4))));
    }
}
