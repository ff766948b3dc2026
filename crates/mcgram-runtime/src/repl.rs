//! `mcgram rcon`: one-shot console command or an interactive prompt.

use std::io::{self, BufRead, Write};

use mcgram_rcon::ConsoleCommandRunner;

use crate::cli::RconOpts;

const PROMPT: &str = "> ";

pub fn cmd_rcon(opts: &RconOpts) -> anyhow::Result<()> {
    let executor = opts.console.executor();
    if opts.command.is_empty() {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        prompt_loop(&executor, stdin.lock(), &mut stdout)?;
        return Ok(());
    }

    let response = executor.run(&opts.command.join(" "))?;
    println!("{response}");
    Ok(())
}

/// Read commands line by line until EOF. Console errors are printed and the
/// prompt continues.
pub fn prompt_loop<R, I, O>(runner: &R, input: I, output: &mut O) -> io::Result<()>
where
    R: ConsoleCommandRunner,
    I: BufRead,
    O: Write,
{
    let mut lines = input.lines();
    loop {
        write!(output, "{PROMPT}")?;
        output.flush()?;

        let Some(line) = lines.next().transpose()? else {
            writeln!(output)?;
            return Ok(());
        };
        let command = line.trim();
        if command.is_empty() {
            continue;
        }

        match runner.run(command) {
            Ok(response) => writeln!(output, "{response}")?,
            Err(e) => writeln!(output, "error: {e}")?,
        }
    }
}
