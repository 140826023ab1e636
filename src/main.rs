use chrono::Local;
use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use vr_bac::controller::replay::{ReplayCollector, ReplayScript};
use vr_bac::mapping::{
    BacEngine, EngineContext, EventContext, FeatureListener, Hand, LogicalButton, Subscription,
};
use vr_bac::persistence::profile_store::{
    default_profile_path, ensure_default_profile, load_profile,
};
use vr_bac::persistence::BindingProfile;

#[derive(Parser)]
#[command(name = "vr-bac-replay")]
#[command(about = "Replay scripted controller input through the BAC engine")]
struct Args {
    /// Binding profile (TOML), defaults to the user profile
    #[arg(short = 'p', long)]
    profile: Option<PathBuf>,

    /// Replay script (TOML)
    #[arg(short = 's', long)]
    script: PathBuf,

    /// Frame rate, overrides the profile setting
    #[arg(long)]
    fps: Option<u32>,
}

/// Logs every semantic event it receives
struct LoggingListener;

impl LoggingListener {
    fn log(event: &str, ctx: &EventContext<'_>) {
        match ctx.timer_elapsed {
            Some(elapsed) => info!(
                "[frame {}] {} {} on {} {} (timer {:.3}s)",
                ctx.frame, ctx.feature, event, ctx.hand, ctx.button, elapsed
            ),
            None => info!(
                "[frame {}] {} {} on {} {}",
                ctx.frame, ctx.feature, event, ctx.hand, ctx.button
            ),
        }
    }
}

impl FeatureListener for LoggingListener {
    fn on_start_click(&mut self, ctx: &EventContext<'_>) {
        Self::log("start-click", ctx);
    }

    fn on_is_clicking(&mut self, ctx: &EventContext<'_>) {
        debug!("[frame {}] {} is clicking", ctx.frame, ctx.feature);
    }

    fn on_stop_click(&mut self, ctx: &EventContext<'_>) {
        Self::log("stop-click", ctx);
    }

    fn on_start_touch(&mut self, ctx: &EventContext<'_>) {
        Self::log("start-touch", ctx);
    }

    fn on_is_touching(&mut self, ctx: &EventContext<'_>) {
        debug!("[frame {}] {} is touching", ctx.frame, ctx.feature);
    }

    fn on_stop_touch(&mut self, ctx: &EventContext<'_>) {
        Self::log("stop-touch", ctx);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;
    let args = Args::parse();

    let profile = setup_profile(args.profile).await?;
    let fps = args.fps.unwrap_or(profile.settings.frame_rate);
    if fps == 0 {
        return Err(eyre!("Frame rate must be positive"));
    }

    let content = tokio::fs::read_to_string(&args.script)
        .await
        .map_err(|e| eyre!("Failed to read replay script {}: {}", args.script.display(), e))?;
    let script = ReplayScript::from_toml(&content)
        .map_err(|e| eyre!("Failed to load replay script: {}", e))?;
    let mut collector = ReplayCollector::create(script)
        .map_err(|e| eyre!("Failed to create replay collector: {}", e))?
        .initialize();

    let mut ctx = EngineContext::new(profile.settings.clone());
    let mut engine = BacEngine::create();
    for config in profile.bindings {
        if let Err(e) = engine.register_binding(config) {
            warn!("Skipping binding: {}", e);
        }
    }
    let mut engine = engine.activate(&ctx);

    // One logger per pair, so bindings moved by a backend switch stay visible
    let mut subscriptions: Vec<Subscription> = Vec::new();
    for hand in [Hand::Left, Hand::Right, Hand::Gaze] {
        for button in LogicalButton::ALL {
            subscriptions.push(engine.registry().subscribe(hand, button, LoggingListener));
        }
    }
    debug!("Subscribed {} logging listeners", subscriptions.len());

    info!(
        "Replaying {} at {} fps ({} frames)",
        collector.script().name,
        fps,
        collector.script().frame_count()
    );
    let mut interval_timer =
        tokio::time::interval(tokio::time::Duration::from_secs_f64(1.0 / fps as f64));

    let started = Local::now();
    let mut frames: u64 = 0;
    let mut total_events = 0;
    let mut last_stats_time = started;
    let stats_interval = chrono::Duration::seconds(5);

    loop {
        interval_timer.tick().await;

        let Some(dt) = collector.step(&mut ctx) else {
            break;
        };
        let report = engine.tick(&ctx, dt);
        frames += 1;
        total_events += report.events;

        if report.backend_changed {
            info!(
                "Backend switched to {}: {} unusable bindings",
                ctx.active_backend(),
                report.unusable
            );
        }
        if report.deferred > 0 {
            debug!("{} bindings waiting for raw input", report.deferred);
        }

        let now = Local::now();
        if now - last_stats_time > stats_interval {
            let elapsed_seconds = (now - started).num_milliseconds() as f64 / 1000.0;
            info!(
                "Replay stats: {} frames, {} events in {:.1} seconds",
                frames, total_events, elapsed_seconds
            );
            last_stats_time = now;
        }
    }

    let finished = Local::now();
    info!(
        "Replay finished at {}: {} frames, {} events in {} ms",
        finished.format("%H:%M:%S.%3f"),
        frames,
        total_events,
        (finished - started).num_milliseconds()
    );

    drop(subscriptions);
    let _stopped = engine.shutdown();
    Ok(())
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}

async fn setup_profile(path: Option<PathBuf>) -> Result<BindingProfile> {
    match path {
        Some(path) => load_profile(&path).await,
        None => ensure_default_profile(&default_profile_path()).await,
    }
}
