use mirror_store::{Line, MirrorStore, StoreError};
use serde_json::Value;
use tracing::debug;

use super::Event;
use crate::json;
use crate::time::parse_date;

/// Print a line in the buffer of the event.
///
/// A line with `y >= 0` replaces row `y` of a free-content buffer; any other
/// line is appended.
pub fn handle<S>(store: &mut S, event: &Event<'_>, body: &Value) -> Result<(), StoreError>
where
    S: MirrorStore + ?Sized,
{
    let Some(buffer) = event.buffer else {
        return Ok(());
    };

    let y = json::get_i64(body, "y", -1);
    let (date, date_usec) = json::get_str(body, "date")
        .and_then(parse_date)
        .unwrap_or((0, 0));
    let line = Line {
        date,
        date_usec,
        tags: join_tags(body),
        message: message_text(
            json::get_str(body, "prefix"),
            json::get_str(body, "message").unwrap_or_default(),
        ),
    };

    if y < 0 {
        return store.print(buffer, &line);
    }
    match i32::try_from(y) {
        Ok(y) => store.print_y(buffer, y, &line),
        Err(_) => {
            debug!(y, "line row out of range, dropped");
            Ok(())
        }
    }
}

fn join_tags(body: &Value) -> String {
    json::get_array(body, "tags")
        .map(|tags| {
            tags.iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(",")
        })
        .unwrap_or_default()
}

fn message_text(prefix: Option<&str>, message: &str) -> String {
    match prefix {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}\t{message}"),
        _ => message.to_string(),
    }
}
