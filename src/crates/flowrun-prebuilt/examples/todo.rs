//! A to-do list conversation driven by a scripted sequence of messages.
//!
//! The list itself is never stored: every pass replays the flow from the
//! start and rebuilds it from the memoized prompts, while the rendered
//! output is printed at most once per list revision.
//!
//! Run with: cargo run --example todo

use flowrun_core::{flow, Flow, InMemoryStateStore, Session};
use flowrun_prebuilt::{prompt, ChatEvent, IncomingMessage};

struct TodoItem {
    text: String,
    done: bool,
}

fn render(list: &[TodoItem]) -> String {
    if list.is_empty() {
        return "Nothing is planned yet. Send any text to add it to the list.".to_string();
    }

    let mut lines = Vec::new();
    for item in list.iter().filter(|i| i.done) {
        lines.push(format!("[x] {}", item.text));
    }
    for (i, item) in list.iter().filter(|i| !i.done).enumerate() {
        lines.push(format!("[ ] /check{i} {}", item.text));
    }
    lines.join("\n")
}

fn todo() -> Flow<(), ChatEvent> {
    flow("todo", |run| {
        Box::pin(async move {
            let mut list: Vec<TodoItem> = Vec::new();
            loop {
                let rendered = render(&list);
                run.memo(async move {
                    println!("{rendered}\n");
                    Ok(rendered)
                })
                .await?;

                let message = prompt(run, false).await?;
                if let Some(rest) = message.text.strip_prefix("/check") {
                    if let Ok(index) = rest.trim().parse::<usize>() {
                        if let Some(item) = list.iter_mut().filter(|i| !i.done).nth(index) {
                            item.done = true;
                        }
                    }
                } else if message.text == "/quit" {
                    return Ok(());
                } else if !message.text.starts_with('/') {
                    list.push(TodoItem {
                        text: message.text,
                        done: false,
                    });
                }
            }
        })
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::new(InMemoryStateStore::new());
    let root = todo();

    let script = ["buy milk", "call the plumber", "/check0", "/quit"];
    for (i, text) in script.iter().enumerate() {
        println!(">>> {text}");
        let event = ChatEvent::Message(IncomingMessage {
            message_id: i as i64 + 1,
            text: (*text).to_string(),
        });
        let report = session.handle("demo", event, &root).await?;
        println!("    ({:?})\n", report.outcome);
    }

    Ok(())
}
