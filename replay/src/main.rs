#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

use std::collections::VecDeque;
use std::str::FromStr;

use abstutil::Timer;
use anyhow::Result;
use geom::{Duration, Time};
use structopt::StructOpt;

use trail_model::{
    Button, ControlPanel, ControlState, LocationEvent, LocationSource, RecordingHost,
    ReplaySource, SessionOutcome, Tracer, TracerConfig,
};

/// Replays a recorded track through the tracer, as if it were arriving live.
#[derive(StructOpt)]
struct Args {
    /// The path to a CSV file with time, latitude, longitude, and optionally heading columns
    #[structopt(long)]
    input: String,
    /// The path to a JSON file overriding the default tuning
    #[structopt(long)]
    config: Option<String>,
    /// Press a button at some point in the replay, like `1500:center`. Can be repeated.
    #[structopt(long = "press")]
    presses: Vec<Press>,
    /// Milliseconds between simulated display frames
    #[structopt(long, default_value = "16")]
    frame_ms: f64,
    /// Where to write the saved positions
    #[structopt(long, default_value = "data/output/trail.json")]
    output: String,
}

#[derive(Debug, PartialEq)]
struct Press {
    at: Time,
    button: Button,
}

impl FromStr for Press {
    type Err = anyhow::Error;

    fn from_str(x: &str) -> Result<Self> {
        let (at, button) = match x.split_once(':') {
            Some(pair) => pair,
            None => bail!("--press {} should look like 1500:center", x),
        };
        let ms: f64 = at.parse()?;
        if !ms.is_finite() || ms < 0.0 {
            bail!("--press {} has to happen at some point during the replay", x);
        }
        Ok(Self {
            at: Time::START_OF_DAY + Duration::seconds(ms / 1000.0),
            button: button.parse()?,
        })
    }
}

fn main() -> Result<()> {
    abstutil::logger::setup();

    let args = Args::from_iter(abstutil::cli_args());
    if !args.frame_ms.is_finite() || args.frame_ms <= 0.0 {
        bail!("--frame-ms must be positive");
    }
    let frame = Duration::seconds(args.frame_ms / 1000.0);

    let mut timer = Timer::new("replay track");
    let config = match args.config {
        Some(ref path) => abstio::maybe_read_json::<TracerConfig>(path.clone(), &mut timer)?,
        None => TracerConfig::default(),
    };
    timer.start("load input");
    let mut source = ReplaySource::load(fs_err::File::open(&args.input)?)?;
    timer.stop("load input");

    let mut presses: Vec<Press> = args.presses;
    presses.sort_by(|a, b| a.at.partial_cmp(&b.at).unwrap_or(std::cmp::Ordering::Equal));
    let mut presses: VecDeque<Press> = presses.into();

    let mut panel = ControlPanel::new();
    let mut host = RecordingHost::new(source.gps_bounds().clone());
    let mut tracer = Tracer::new(&config, &mut panel);
    info!(
        "Replaying {} positions over {}: {}",
        source.remaining(),
        source.duration(),
        panel.describe()
    );

    timer.start("replay");
    let mut now = Time::START_OF_DAY;
    let mut source_done = false;
    let outcome = loop {
        let mut outcome = None;
        while presses.front().map(|p| p.at <= now).unwrap_or(false) {
            if let Some(press) = presses.pop_front() {
                outcome = tracer.press(press.button, &mut panel)?;
                info!("At {}: {}", now, panel.describe());
                if outcome.is_some() {
                    break;
                }
            }
        }
        if let Some(outcome) = outcome {
            break outcome;
        }

        if tracer.is_listening() {
            while let Some(ev) = source.poll(now) {
                if ev == LocationEvent::Stop {
                    source_done = true;
                }
                tracer.on_location(ev, &mut host)?;
            }
        }
        tracer.on_frame(now, &mut host);

        if source_done && presses.is_empty() {
            // Ran out of input without the session ending. Keep whatever was traced.
            let button = if tracer.state() == ControlState::Standby {
                Button::Right
            } else {
                Button::Left
            };
            match tracer.press(button, &mut panel)? {
                Some(outcome) => break outcome,
                None => bail!("Pressing {:?} didn't end the session", button),
            }
        }
        now += frame;
    };
    timer.stop("replay");

    info!(
        "{} redraws requested, {} preview points",
        host.redraws_requested,
        host.preview.len()
    );
    match outcome {
        SessionOutcome::Saved(log) => {
            info!(
                "Saving {} positions ({} omitted, {} on the route) to {}",
                log.len(),
                log.omitted_count(),
                log.recorded_route().len(),
                args.output
            );
            abstio::write_json(args.output, &log);
        }
        SessionOutcome::Cancelled => {
            info!("Cancelled, so nothing saved");
        }
    }
    Ok(())
}
