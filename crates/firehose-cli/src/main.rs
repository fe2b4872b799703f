//! Jetstream post firehose monitor CLI.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use firehose_cli::control::HELP;
use firehose_cli::{
    format_post, parse_input, render_report, ControlInput, SessionStats, WordSelection,
};
use firehose_core::{
    init_logging, validate_fraction, validate_window_secs, AppConfig, LogConfig, StatsSnapshot,
};
use firehose_stream::{
    connect, ChannelConsumer, ConnectionStatus, ControlCommand, StreamCoordinator, StreamUpdate,
};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "firehose")]
#[command(about = "Bluesky Jetstream post firehose monitor", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 설정 파일 경로 (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// 로그 형식 (pretty, json, compact)
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// 스트림에 연결해 포스트와 윈도우 통계를 출력
    Watch(WatchArgs),

    /// 최종 설정 출력 (파일 + 환경 변수 + 옵션)
    ShowConfig,
}

#[derive(Args)]
struct WatchArgs {
    /// WebSocket 구독 주소
    #[arg(long)]
    url: Option<String>,

    /// 윈도우 길이 (초, 1..=300)
    #[arg(long)]
    window: Option<u64>,

    /// 샘플링 비율 (0, 1]
    #[arg(long)]
    fraction: Option<f64>,

    /// 대소문자 무시 텍스트 필터
    #[arg(long)]
    filter: Option<String>,

    /// 리포트에 표시할 상위 단어 수
    #[arg(long, default_value_t = 10)]
    top: usize,

    /// 리포트 주기 (초)
    #[arg(long, default_value_t = 5)]
    report_secs: u64,

    /// 이 단어 중 하나가 포함된 포스트만 표시 (쉼표로 구분)
    #[arg(long, value_delimiter = ',')]
    only_words: Vec<String>,

    /// 포스트 본문을 출력하지 않음 (리포트만)
    #[arg(long)]
    no_posts: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref()).context("설정 로드 실패")?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }

    match cli.command {
        Commands::ShowConfig => {
            config.validate()?;
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
        Commands::Watch(args) => {
            apply_overrides(&mut config, &args)?;
            config.validate()?;

            init_logging(LogConfig::from_settings(&config.logging))
                .map_err(|e| anyhow::anyhow!("로깅 초기화 실패: {}", e))?;

            watch(config, args).await
        }
    }
}

fn apply_overrides(config: &mut AppConfig, args: &WatchArgs) -> anyhow::Result<()> {
    if let Some(url) = &args.url {
        config.stream.url = url.clone();
    }
    if let Some(window) = args.window {
        config.stream.window_secs = validate_window_secs(window)?;
    }
    if let Some(fraction) = args.fraction {
        config.stream.fraction = validate_fraction(fraction)?;
    }
    if let Some(filter) = &args.filter {
        config.stream.filter = filter.clone();
    }
    if args.report_secs == 0 {
        anyhow::bail!("--report-secs must be greater than zero");
    }
    Ok(())
}

async fn watch(config: AppConfig, args: WatchArgs) -> anyhow::Result<()> {
    tracing::info!(
        url = %config.stream.url,
        window_secs = config.stream.window_secs,
        fraction = config.stream.fraction,
        filter = %config.stream.filter,
        "Firehose monitor starting"
    );

    let (consumer, mut updates) = ChannelConsumer::channel(config.stream.channel_capacity);
    let coordinator = StreamCoordinator::from_config(consumer, &config.stream);
    let handle = match connect(&config.stream.url, coordinator).await {
        Ok(handle) => handle,
        Err(e) if e.is_retryable() => {
            anyhow::bail!("Jetstream 연결 실패 (일시적 오류, 잠시 후 다시 시도하세요): {}", e)
        }
        Err(e) => return Err(anyhow::Error::new(e).context("Jetstream 연결 실패")),
    };

    let selection = WordSelection::new(&args.only_words);
    let mut window_secs = config.stream.window_secs;
    let mut latest: Option<StatsSnapshot> = None;
    let mut stats = SessionStats::new();
    let started = Instant::now();

    let mut report = tokio::time::interval(Duration::from_secs(args.report_secs));
    report.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    // 첫 tick은 즉시 완료되므로 소비
    report.tick().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    eprintln!("{}", HELP);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown signal received");
                break;
            }
            update = updates.recv() => {
                match update {
                    Some(StreamUpdate::Message { event, stats: snapshot }) => {
                        if let Some(event) = event {
                            stats.events += 1;
                            if !args.no_posts && selection.accepts(&event) {
                                if let Some(line) = format_post(&event) {
                                    stats.shown += 1;
                                    println!("{}", line);
                                }
                            }
                        }
                        if let Some(snapshot) = snapshot {
                            stats.snapshots += 1;
                            latest = Some(snapshot);
                        }
                    }
                    Some(StreamUpdate::Status(status)) => match status {
                        ConnectionStatus::Connected => tracing::info!("Stream connected"),
                        ConnectionStatus::Closed => {
                            tracing::warn!("Stream closed by server");
                            break;
                        }
                        ConnectionStatus::Disconnected => break,
                        ConnectionStatus::Error(e) => {
                            tracing::error!("Stream error: {}", e);
                            break;
                        }
                    },
                    None => {
                        tracing::warn!("Update channel closed");
                        break;
                    }
                }
            }
            _ = report.tick() => {
                match &latest {
                    Some(snapshot) => print!("{}", render_report(snapshot, args.top, window_secs)),
                    None => tracing::debug!("No statistics received yet"),
                }
            }
            line = lines.next_line(), if stdin_open => {
                match line {
                    Ok(Some(line)) => match parse_input(&line) {
                        Ok(ControlInput::Command(ControlCommand::Disconnect)) => break,
                        Ok(ControlInput::Command(command)) => {
                            if let ControlCommand::SetTimeout(secs) = &command {
                                window_secs = *secs;
                            }
                            tracing::info!(?command, "Applying control command");
                            if handle.send(command).await.is_err() {
                                tracing::warn!("Stream task no longer running");
                                break;
                            }
                        }
                        Ok(ControlInput::Help) => eprintln!("{}", HELP),
                        Ok(ControlInput::Empty) => {}
                        Err(e) => {
                            stats.rejected_commands += 1;
                            tracing::warn!("{}", e);
                        }
                    },
                    Ok(None) => {
                        tracing::debug!("stdin closed, control commands disabled");
                        stdin_open = false;
                    }
                    Err(e) => {
                        tracing::warn!("stdin read failed: {}", e);
                        stdin_open = false;
                    }
                }
            }
        }
    }

    let outcome = handle.disconnect().await?;
    tracing::debug!(?outcome, "Stream task finished");

    stats.elapsed = started.elapsed();
    stats.log_summary();

    Ok(())
}
