//! Interactive query loop.

use runtime::{Backend, Orchestrator, ToolSession};
use std::fmt::Display;
use std::future::Future;
use std::io::{self, BufRead, Write};

/// Something that answers a query.
pub trait Respond {
    type Error: Display;

    fn respond(&self, query: &str) -> impl Future<Output = Result<String, Self::Error>>;
}

impl<S: ToolSession, B: Backend> Respond for Orchestrator<S, B> {
    type Error = runtime::Error;

    async fn respond(&self, query: &str) -> Result<String, Self::Error> {
        self.process_query(query).await
    }
}

/// Print an answer the way the shell shows it, after a blank line.
pub fn write_response(mut output: impl Write, response: &str) -> io::Result<()> {
    writeln!(output, "\n{response}")
}

/// Read queries line by line until `quit` or end of input.
///
/// Query failures are printed and the loop keeps going; only I/O errors on
/// the streams themselves end it early.
pub async fn chat_loop<R, I, O>(agent: &R, mut input: I, mut output: O) -> io::Result<()>
where
    R: Respond,
    I: BufRead,
    O: Write,
{
    writeln!(output, "\nMCP Client Started!")?;
    writeln!(output, "Type your queries or 'quit' to exit.")?;

    loop {
        write!(output, "\nQuery: ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }

        let query = line.trim();
        if query.eq_ignore_ascii_case("quit") {
            break;
        }

        match agent.respond(query).await {
            Ok(response) => write_response(&mut output, &response)?,
            Err(e) => writeln!(output, "\nError: {e}")?,
        }
    }

    Ok(())
}
