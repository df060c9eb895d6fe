//! Interactive step-by-step checkout
//!
//! Each step prompts for its fields in order. A blank answer keeps the current
//! value, `back` returns to the previous step and `quit` (or end of input)
//! leaves. A field is re-prompted until it validates.

use anyhow::Result;
use checkout_client::{CheckoutSession, ClientError};
use checkout_core::{Field, Stage, Step, StepError};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};

use crate::prompt::{PromptResponse, parse_field};
use crate::render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldFlow {
    Accepted,
    Back,
    Quit,
}

/// Terminal front end over one checkout session
pub struct Wizard<R, W> {
    session: CheckoutSession,
    input: Lines<R>,
    output: W,
}

impl<R, W> Wizard<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(session: CheckoutSession, input: R, output: W) -> Self {
        Self {
            session,
            input: input.lines(),
            output,
        }
    }

    /// Run until the user quits or input ends
    pub async fn run(&mut self) -> Result<()> {
        loop {
            let flow = match self.session.stage() {
                Stage::Active(step) => self.step(step).await?,
                Stage::Done => self.confirmation().await?,
            };
            if flow == Flow::Quit {
                tracing::info!(session = %self.session.id(), "Checkout left");
                return Ok(());
            }
        }
    }

    async fn step(&mut self, step: Step) -> Result<Flow> {
        self.say(&render::step_header(step)).await?;
        if step == Step::Review {
            let text = format!(
                "{}\n{}",
                render::review(self.session.form()),
                render::summary(&self.session.quote())
            );
            self.say(&text).await?;
        }

        for &field in step.fields() {
            match self.field(field).await? {
                FieldFlow::Accepted => {}
                FieldFlow::Back => {
                    self.session.back()?;
                    return Ok(Flow::Continue);
                }
                FieldFlow::Quit => return Ok(Flow::Quit),
            }
        }

        if step == Step::Subscription {
            self.say(&render::summary(&self.session.quote())).await?;
        }
        if step.is_last() {
            self.say("Placing your order...").await?;
        }

        match self.session.next().await {
            Ok(_) => {}
            Err(ClientError::Step(StepError::Invalid { errors, .. })) => {
                self.say(&render::errors(&errors)).await?;
            }
            Err(e) => {
                let hint = if e.is_retryable() { " Press Enter to keep your details and retry." } else { "" };
                self.say(&format!("  ! {}{hint}", e.user_message())).await?;
            }
        }

        Ok(Flow::Continue)
    }

    async fn field(&mut self, field: Field) -> Result<FieldFlow> {
        loop {
            let prompt = render::field_prompt(field, self.session.form(), self.session.catalog());
            self.ask(&prompt).await?;

            let Some(line) = self.input.next_line().await? else {
                return Ok(FieldFlow::Quit);
            };

            match PromptResponse::parse(&line) {
                PromptResponse::Quit => return Ok(FieldFlow::Quit),
                PromptResponse::Back if self.session.can_back() => return Ok(FieldFlow::Back),
                PromptResponse::Back => {
                    self.say("  Already at the first step").await?;
                    continue;
                }
                PromptResponse::Keep => {}
                PromptResponse::Value(text) => match parse_field(field, &text) {
                    Ok(value) => self.session.edit(value)?,
                    Err(message) => {
                        self.say(&format!("  ! {message}")).await?;
                        continue;
                    }
                },
            }

            match self.session.validator().check(field, self.session.form()) {
                Ok(()) => return Ok(FieldFlow::Accepted),
                Err(e) => self.say(&format!("  ! {}", e.user_message())).await?,
            }
        }
    }

    async fn confirmation(&mut self) -> Result<Flow> {
        self.ask(&render::done()).await?;

        let Some(line) = self.input.next_line().await? else {
            return Ok(Flow::Quit);
        };
        if PromptResponse::parse(&line) == PromptResponse::Quit {
            return Ok(Flow::Quit);
        }

        self.session.reset()?;
        Ok(Flow::Continue)
    }

    async fn say(&mut self, text: &str) -> Result<()> {
        self.output.write_all(text.as_bytes()).await?;
        if !text.ends_with('\n') {
            self.output.write_all(b"\n").await?;
        }
        self.output.flush().await?;
        Ok(())
    }

    async fn ask(&mut self, prompt: &str) -> Result<()> {
        self.output.write_all(prompt.as_bytes()).await?;
        self.output.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
impl<R, W> Wizard<R, W> {
    fn into_parts(self) -> (CheckoutSession, W) {
        (self.session, self.output)
    }
}
