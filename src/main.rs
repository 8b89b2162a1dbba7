// ==========================================
// 选矿厂生产数据对比系统 - 命令行入口
// ==========================================
// 子命令: import | compare | compare-file | cancel-import | profiles
// 输出: 结果写 stdout，日志写 stderr
// ==========================================

use anyhow::{anyhow, Context, Result};
use mineral_plant_compare::app::{get_default_db_path, AppState};
use mineral_plant_compare::cli::{self, Args, Command, OutputFormat};
use mineral_plant_compare::domain::record::DateRange;
use mineral_plant_compare::importer::load_record_set;
use mineral_plant_compare::{i18n, logging};
use serde::Serialize;

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_range(start: Option<&str>, end: Option<&str>) -> Result<Option<DateRange>> {
    match (start, end) {
        (Some(s), Some(e)) => {
            let start = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .with_context(|| format!("开始日期格式错误: {}", s))?;
            let end = chrono::NaiveDate::parse_from_str(e, "%Y-%m-%d")
                .with_context(|| format!("结束日期格式错误: {}", e))?;
            DateRange::new(start, end)
                .map(Some)
                .ok_or_else(|| anyhow!("开始日期 {} 晚于结束日期 {}", s, e))
        }
        _ => Ok(None),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse_args();

    logging::init_with(logging::level_for(args.verbose), args.log_format);
    i18n::set_locale(&args.locale);

    tracing::info!(version = mineral_plant_compare::VERSION, "{}", mineral_plant_compare::APP_NAME);

    let db_path = args.db.clone().unwrap_or_else(get_default_db_path);
    let state = AppState::new(db_path).map_err(|e| anyhow!(e))?;

    match &args.command {
        Command::Import {
            source,
            date_field,
            files,
        } => {
            let paths = files
                .iter()
                .map(|p| p.to_string_lossy().to_string())
                .collect();
            let results = state
                .import_api
                .import_files(paths, source, Some(date_field.as_str()))
                .await?;

            let mut failed = 0usize;
            for result in &results {
                match result {
                    Ok(resp) if args.format == OutputFormat::Json => print_json(resp)?,
                    Ok(resp) => print!("{}", cli::render_import(resp)),
                    Err(msg) => {
                        failed += 1;
                        eprintln!("{}", msg);
                    }
                }
            }
            if failed > 0 {
                return Err(anyhow!("{} 个文件导入失败", failed));
            }
        }

        Command::Compare {
            profile,
            start,
            end,
        } => {
            let response = state.comparison_api.compare(profile, start, end)?;
            match args.format {
                OutputFormat::Json => print_json(&response)?,
                OutputFormat::Table => print!("{}", cli::render_comparison(&response)),
            }
        }

        Command::CompareFile {
            profile,
            date_field,
            start,
            end,
            file,
        } => {
            let range = parse_range(start.as_deref(), end.as_deref())?;
            let set = load_record_set(file, date_field.as_deref(), range)?;
            let response = state.comparison_api.compare_record_set(profile, &set)?;
            match args.format {
                OutputFormat::Json => print_json(&response)?,
                OutputFormat::Table => print!("{}", cli::render_comparison(&response)),
            }
        }

        Command::CancelImport { batch_id } => {
            let deleted = state.import_api.cancel_import_batch(batch_id)?;
            println!("{}: {}", batch_id, deleted);
        }

        Command::Profiles => {
            let profiles = state.comparison_api.list_profiles()?;
            match args.format {
                OutputFormat::Json => print_json(&profiles)?,
                OutputFormat::Table => print!("{}", cli::render_profiles(&profiles)),
            }
        }
    }

    Ok(())
}
