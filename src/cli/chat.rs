use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use uuid::Uuid;

use crate::chat::{ChatSession, HistoryRoles, Submission, TYPING_INDICATOR, render_transcript};
use crate::core::AppConfig;
use crate::mistral::MistralClient;

pub async fn run(model: Option<String>, history_roles: Option<HistoryRoles>) -> Result<()> {
    let mut rl = DefaultEditor::new()?;

    let mut config = AppConfig::default();
    if let Some(model) = model {
        config.model = model;
    }
    if let Some(roles) = history_roles {
        config.history_roles = roles;
    }

    let client = MistralClient::from(&config);
    let mut session =
        ChatSession::new(&Uuid::new_v4().to_string()).history_roles(config.history_roles);

    loop {
        let readline = rl.readline(">>> ");
        match readline {
            Ok(line) => {
                let before = session.transcript().len();
                if !line.trim().is_empty() {
                    println!("{}", TYPING_INDICATOR);
                }
                match session.submit_user_message(&client, &line).await {
                    Submission::Ignored => continue,
                    Submission::Busy => {
                        println!("Still waiting on the last reply");
                        continue;
                    }
                    Submission::Started(_) | Submission::Completed(_) => {}
                }
                let _ = rl.add_history_entry(line.as_str());

                // Print only the turns this submission added
                for turn in render_transcript(session.transcript()).iter().skip(before) {
                    println!("{}", turn);
                }
            }
            Err(ReadlineError::Interrupted) => break,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}
