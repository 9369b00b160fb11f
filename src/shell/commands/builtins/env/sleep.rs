// Sleep command

use crate::shell::commands::Command;
use crate::shell::context::CommandContext;
use anyhow::{Context, Result, bail};
use std::thread;
use std::time::{Duration, Instant};

pub struct SleepCommand;

const TICK: Duration = Duration::from_millis(20);

impl Command for SleepCommand {
    fn name(&self) -> &str {
        "sleep"
    }

    fn execute(&self, ctx: &mut CommandContext<'_>, args: &[String]) -> Result<()> {
        let Some(value) = args.first() else {
            bail!("usage: sleep seconds");
        };
        let seconds: f64 = value
            .parse()
            .with_context(|| format!("invalid time interval: {}", value))?;
        let interval = Duration::try_from_secs_f64(seconds)
            .with_context(|| format!("invalid time interval: {}", value))?;

        // Sleep in short ticks so an interrupt is noticed promptly.
        let deadline = Instant::now()
            .checked_add(interval)
            .with_context(|| format!("invalid time interval: {}", value))?;
        loop {
            ctx.check_cancelled()?;
            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }
            thread::sleep(TICK.min(deadline - now));
        }
    }

    fn help(&self) -> &str {
        "sleep seconds\n\nPause for the given (possibly fractional) number of seconds."
    }

    fn short_help(&self) -> &str {
        "pause for a while"
    }
}
