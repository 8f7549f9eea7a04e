//! Command-line interceptor
//!
//! Every visible registered tunable becomes one long option named after its
//! key, e.g. `--layout.iterations <INT>`. The whole argument vector is
//! parsed before anything is loaded; value conversion then happens per field
//! through the interceptor, so a bad value fails only its own field.

use crate::outcome::{CliOutcome, ExitRequest};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::collections::HashSet;
use std::ffi::OsString;
use tunable_core::{
    HandlerDescriptor, HandlerFactory, InterceptResult, Interceptor, StandardFactory, TargetId,
    ValueKind,
};
use tunable_props::PropertyMap;

const HELP_ID: &str = "help";

/// Binds an interceptor's tunables to command-line options
#[derive(Debug)]
pub struct CommandLineInterceptor<'a, F = StandardFactory> {
    interceptor: &'a Interceptor<F>,
    program: String,
    about: Option<String>,
}

impl<'a, F: HandlerFactory> CommandLineInterceptor<'a, F> {
    /// Create for an interceptor and a program name
    #[must_use]
    pub fn new(interceptor: &'a Interceptor<F>, program: impl Into<String>) -> Self {
        Self {
            interceptor,
            program: program.into(),
            about: None,
        }
    }

    /// Set the description shown at the top of the usage text
    #[must_use]
    pub fn with_about(mut self, about: impl Into<String>) -> Self {
        self.about = Some(about.into());
        self
    }

    /// Program name
    #[inline]
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Build the option set from the handlers registered right now
    ///
    /// Hidden tunables get no option. When two targets share a key, one
    /// option serves both.
    #[must_use]
    pub fn build_command(&self) -> Command {
        let mut command = Command::new(self.program.clone())
            .disable_help_flag(true)
            .disable_version_flag(true)
            .args_override_self(true)
            .arg(
                Arg::new(HELP_ID)
                    .short('h')
                    .long("help")
                    .action(ArgAction::SetTrue)
                    .help("Print help"),
            );
        if let Some(about) = &self.about {
            command = command.about(about.clone());
        }

        let mut seen = HashSet::new();
        for descriptor in self.interceptor.descriptors() {
            if descriptor.meta.hidden || !seen.insert(descriptor.key.clone()) {
                continue;
            }
            command = command.arg(option_for(&descriptor));
        }
        command
    }

    /// Usage text listing every option
    #[must_use]
    pub fn usage(&self) -> String {
        self.build_command().render_help().to_string()
    }

    /// Parse `args` (without the program name) into key/value pairs
    ///
    /// # Errors
    /// Returns the [`ExitRequest`] the host should act on: a successful one
    /// for `-h`/`--help`, a failed one if the arguments do not parse.
    pub fn parse<I, T>(&self, args: I) -> Result<PropertyMap, ExitRequest>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let mut command = self.build_command();
        let argv = std::iter::once(OsString::from(&self.program)).chain(args.into_iter().map(Into::into));

        let matches = match command.try_get_matches_from_mut(argv) {
            Ok(matches) => matches,
            Err(err) => {
                let error = err.render().to_string();
                let usage = command.render_help().to_string();
                tracing::debug!(program = %self.program, "command line rejected");
                return Err(ExitRequest::failure(format!("{}\n\n{usage}", error.trim_end())));
            }
        };

        if matches.get_flag(HELP_ID) {
            return Err(ExitRequest::success(command.render_help().to_string()));
        }

        Ok(collect_values(&matches))
    }

    /// Parse `args` and load the values into every registered target
    ///
    /// Parsing is all-or-nothing; loading is best effort per field.
    pub fn apply<I, T>(&self, args: I) -> CliOutcome
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        match self.parse(args) {
            Ok(values) => CliOutcome::Proceed(self.interceptor.load_all(&values)),
            Err(exit) => CliOutcome::Exit(exit),
        }
    }

    /// Parse `args` and load the values into the given targets only
    ///
    /// # Errors
    /// Propagates [`Interceptor::load`] errors, such as an unregistered
    /// target under the strict policy
    pub fn apply_to<I, T, G>(&self, args: I, targets: G) -> InterceptResult<CliOutcome>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
        G: IntoIterator,
        G::Item: Into<TargetId>,
    {
        match self.parse(args) {
            Ok(values) => self.interceptor.load(&values, targets).map(CliOutcome::Proceed),
            Err(exit) => Ok(CliOutcome::Exit(exit)),
        }
    }
}

fn option_for(descriptor: &HandlerDescriptor) -> Arg {
    let mut help = descriptor.meta.description.clone();
    if let Some(values) = &descriptor.possible_values {
        help.push_str(&format!(" [possible values: {}]", values.join(", ")));
    }
    if let Some(current) = &descriptor.current {
        help.push_str(&format!(" [current: {current}]"));
    }

    let mut arg = Arg::new(descriptor.key.clone())
        .long(descriptor.key.clone())
        .value_name(descriptor.kind.value_name())
        .action(ArgAction::Set)
        .allow_hyphen_values(true)
        .help(help);
    if descriptor.kind == ValueKind::Boolean {
        arg = arg.num_args(0..=1).default_missing_value("true");
    }
    if let Some(group) = &descriptor.meta.group {
        arg = arg.help_heading(group.clone());
    }
    arg
}

fn collect_values(matches: &ArgMatches) -> PropertyMap {
    matches
        .ids()
        .map(clap::Id::as_str)
        .filter(|id| *id != HELP_ID)
        .filter_map(|id| {
            let value = matches.try_get_one::<String>(id).ok().flatten()?;
            Some((id.to_string(), value.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tunable_core::{shared, Schema, Tunable, TunableMeta};

    struct Counter {
        count: i64,
        enabled: bool,
    }

    impl Tunable for Counter {
        fn declare(&self, schema: &mut Schema<Self>) {
            schema
                .integer(
                    "count",
                    TunableMeta::new("counter", "How many").with_group("Counting"),
                    |c| c.count,
                    |c, v| c.count = v,
                )
                .boolean(
                    "enabled",
                    TunableMeta::new("counter", "Whether counting is on"),
                    |c| c.enabled,
                    |c, v| c.enabled = v,
                );
        }
    }

    fn setup() -> (Interceptor, tunable_core::Shared<Counter>) {
        let interceptor = Interceptor::new();
        let counter = shared(Counter {
            count: 1,
            enabled: false,
        });
        interceptor.register(&counter).unwrap();
        (interceptor, counter)
    }

    #[test]
    fn options_follow_handlers() {
        let (interceptor, _counter) = setup();
        let cli = CommandLineInterceptor::new(&interceptor, "counter");
        let command = cli.build_command();

        let longs: Vec<_> = command.get_arguments().filter_map(Arg::get_long).collect();
        assert_eq!(longs, vec!["help", "counter.count", "counter.enabled"]);
    }

    #[test]
    fn negative_numbers_are_values() {
        let (interceptor, counter) = setup();
        let cli = CommandLineInterceptor::new(&interceptor, "counter");

        let outcome = cli.apply(["--counter.count", "-4"]);
        assert!(outcome.report().unwrap().is_clean());
        assert_eq!(counter.read().count, -4);
    }

    #[test]
    fn bare_boolean_flag_means_true() {
        let (interceptor, counter) = setup();
        let cli = CommandLineInterceptor::new(&interceptor, "counter");

        cli.apply(["--counter.enabled"]);
        assert!(counter.read().enabled);

        cli.apply(["--counter.enabled", "false"]);
        assert!(!counter.read().enabled);
    }

    #[test]
    fn last_occurrence_wins() {
        let (interceptor, counter) = setup();
        let cli = CommandLineInterceptor::new(&interceptor, "counter");

        cli.apply(["--counter.count", "2", "--counter.count", "3"]);
        assert_eq!(counter.read().count, 3);
    }

    #[test]
    fn parse_only_returns_given_values() {
        let (interceptor, _counter) = setup();
        let cli = CommandLineInterceptor::new(&interceptor, "counter");

        let values = cli.parse(["--counter.count", "9"]).unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values.get("counter.count"), Some("9"));
    }
}
