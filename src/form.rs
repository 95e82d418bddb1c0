use std::io::{BufRead, Write};

use log::*;
use scopeguard::defer_on_unwind;

use crate::appctl::AppCtl;
use crate::record::{FeedbackForm, Gender, MAX_AGE, MIN_AGE};
use crate::senti::Sentiment;
use crate::{Error, APP_TITLE};

/// Terminal rendition of the feedback page. Reads answers from `input`
/// and draws the page on `output` until the input ends or the app stops.
pub struct ConsoleForm<'a, R, W> {
    appctl: &'a AppCtl,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> ConsoleForm<'a, R, W> {
    pub fn new(appctl: &'a AppCtl, input: R, output: W) -> Self {
        Self {
            appctl,
            input,
            output,
        }
    }

    pub fn run(&mut self) -> Result<(), Error> {
        let appctl = self.appctl;
        defer_on_unwind! { appctl.stop(); }

        writeln!(self.output, "{}", APP_TITLE)?;
        writeln!(
            self.output,
            "Enter your details and feedback to check whether it's Positive or Negative."
        )?;
        self.show_report()?;

        while self.appctl.is_alive() {
            let form = match self.ask_form()? {
                Some(form) => form,
                None => break,
            };
            self.submit(form)?;
            self.show_report()?;

            match self.ask("Submit another feedback? [Y/n]: ")? {
                Some(answer) if answer.trim().to_lowercase().starts_with('n') => break,
                Some(_) => continue,
                None => break,
            }
        }

        debug!("Form closed");
        self.appctl.stop();
        Ok(())
    }

    fn submit(&mut self, form: FeedbackForm) -> Result<(), Error> {
        match self.appctl.submit_feedback(form) {
            Ok(record) => {
                let mark = match record.sentiment {
                    Sentiment::Positive => "✅",
                    Sentiment::Negative => "❌",
                };
                writeln!(self.output, "Sentiment: {} {}", mark, record.sentiment)?;
                writeln!(self.output, "🎉 Your feedback has been recorded successfully!")?;
            }
            Err(Error::EmptyFeedback) => {
                warn!("Empty feedback submitted");
                writeln!(self.output, "⚠️ {}", Error::EmptyFeedback)?;
            }
            Err(e) => return Err(e),
        }
        Ok(())
    }

    fn show_report(&mut self) -> Result<(), Error> {
        let page = match self.appctl.render_report() {
            Ok(Some(page)) => page,
            Ok(None) => return Ok(()),
            Err(e) => {
                // A damaged store should not end the session
                error!("Unable to render report: {}", e);
                writeln!(self.output, "Error: {}", e)?;
                return Ok(());
            }
        };
        writeln!(self.output, "{}", "-".repeat(40))?;
        write!(self.output, "{}", page.report.render_text())?;
        if let Some(charts) = page.charts {
            writeln!(
                self.output,
                "Charts: {} {}",
                charts.bar.display(),
                charts.pie.display()
            )?;
        }
        writeln!(self.output, "{}", "-".repeat(40))?;
        Ok(())
    }

    /// `None` once the input has ended.
    fn ask_form(&mut self) -> Result<Option<FeedbackForm>, Error> {
        let name = match self.ask("Enter your Name: ")? {
            Some(name) => name,
            None => return Ok(None),
        };
        let gender = match self.ask_gender()? {
            Some(gender) => gender,
            None => return Ok(None),
        };
        let age = match self.ask_age()? {
            Some(age) => age,
            None => return Ok(None),
        };
        let email = match self.ask("Enter your Email: ")? {
            Some(email) => email,
            None => return Ok(None),
        };
        let feedback = match self.ask_feedback()? {
            Some(feedback) => feedback,
            None => return Ok(None),
        };
        Ok(Some(FeedbackForm {
            name,
            gender,
            age,
            email,
            feedback,
        }))
    }

    /// A line ending in `\` continues on the next one. Lines are joined with
    /// `\n` and the trailing backslashes dropped.
    fn ask_feedback(&mut self) -> Result<Option<String>, Error> {
        let prompt = "Write your Feedback here (end a line with \\ to continue)...: ";
        let mut feedback = match self.ask(prompt)? {
            Some(line) => line,
            None => return Ok(None),
        };
        while feedback.ends_with('\\') {
            feedback.pop();
            match self.ask("... ")? {
                Some(line) => {
                    feedback.push('\n');
                    feedback.push_str(&line);
                }
                // Keep what was typed so far
                None => break,
            }
        }
        Ok(Some(feedback))
    }

    fn ask_gender(&mut self) -> Result<Option<Gender>, Error> {
        let prompt = format!(
            "Select Gender [1] {} [2] {} [3] {}: ",
            Gender::ALL[0],
            Gender::ALL[1],
            Gender::ALL[2]
        );
        while let Some(answer) = self.ask(&prompt)? {
            if answer.trim().is_empty() {
                return Ok(Some(Gender::default()));
            }
            match answer.parse() {
                Ok(gender) => return Ok(Some(gender)),
                Err(e) => writeln!(self.output, "Please pick one of the options ({})", e)?,
            }
        }
        Ok(None)
    }

    fn ask_age(&mut self) -> Result<Option<u8>, Error> {
        let prompt = format!("Enter Age [{}-{}]: ", MIN_AGE, MAX_AGE);
        while let Some(answer) = self.ask(&prompt)? {
            let answer = answer.trim();
            if answer.is_empty() {
                return Ok(Some(MIN_AGE));
            }
            match answer.parse::<u8>() {
                Ok(age) if (MIN_AGE..=MAX_AGE).contains(&age) => return Ok(Some(age)),
                _ => writeln!(
                    self.output,
                    "Age must be a whole number from {} to {}",
                    MIN_AGE, MAX_AGE
                )?,
            }
        }
        Ok(None)
    }

    /// One line of input without its line ending, `None` at end of input or
    /// once the app has been stopped.
    fn ask(&mut self, prompt: &str) -> Result<Option<String>, Error> {
        if !self.appctl.is_alive() {
            return Ok(None);
        }
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 || !self.appctl.is_alive() {
            return Ok(None);
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(Some(line))
    }
}
