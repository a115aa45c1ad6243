use bbox_annotator::{cli, config, error, export, import, prompt, scanner, session};
use bbox_annotator_common::export_stats;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use cli::{Cli, Commands};
use config::Config;
use error::Result;
use export::ExportFormat;
use session::{MergeReport, Session};

fn init_logger(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn print_merge_report(report: &MergeReport) {
    println!(
        "✔ 画像{}枚 / アノテーション{}件を取り込み",
        report.images_added, report.annotations_added
    );
    for (from, to) in report.label_remap.iter().filter(|(from, to)| from != to) {
        println!("  - ラベルID {} → {} に付け替え", from, to);
    }
    for warning in &report.import_warnings {
        println!("  ⚠ {}", warning);
    }
    for rejected in &report.rejected {
        println!("  ⚠ {}", rejected);
    }
}

fn import_into(session: &mut Session, input: &std::path::Path, images: Option<&std::path::Path>) -> Result<()> {
    println!("- 読み込み中: {}", input.display());
    let imported = import::import_from_coco(input, images)?;
    let report = session.merge_import(imported);
    print_merge_report(&report);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Scan { base, subdirs, output, format } => {
            println!("📂 bbox-annotate - 画像読み込み\n");

            let subdir_config = scanner::SubdirectoryConfig::new(&base, subdirs)?;
            let mut session = config.session();
            let bar = ProgressBar::new(0);
            bar.set_style(
                ProgressStyle::with_template("[{elapsed_precise}] {wide_bar:.cyan/blue} {pos}/{len} 画像")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            let report = session.load_subdirectories_with_progress(
                &subdir_config,
                &scanner::DimensionsLoader,
                |done, total| {
                    bar.set_length(total as u64);
                    bar.set_position(done as u64);
                },
            )?;
            bar.finish_and_clear();

            println!("✔ {}枚の画像を読み込み", report.count());
            for warning in &report.warnings {
                println!("  ⚠ {}", warning);
            }

            if let Some(output) = output {
                let output_path = export::output_path_for_format(&output, format);
                export::export_images(&session.images_for_export(), format, &output_path, config.use_relative_paths)?;
                println!("✔ 出力: {}", output_path.display());
            }
        }

        Commands::Convert { input, images, format, output, flatten } => {
            println!("🔁 bbox-annotate - 変換\n");

            let mut session = config.session();
            import_into(&mut session, &input, images.as_deref())?;

            let output_path = export::output_path_for_format(&output, format);
            let use_relative_paths = config.use_relative_paths && !flatten;
            match format {
                ExportFormat::Csv => session.export_csv(&output_path)?,
                ExportFormat::Coco => session.export_coco(&output_path, use_relative_paths)?,
            }
            println!("✔ {}出力: {}", format, output_path.display());
        }

        Commands::Merge { inputs, images, output } => {
            println!("🧩 bbox-annotate - 統合\n");

            let mut session = config.session();
            for input in &inputs {
                import_into(&mut session, input, images.as_deref())?;
            }

            let output_path = export::output_path_for_format(&output, ExportFormat::Coco);
            session.export_coco(&output_path, config.use_relative_paths)?;
            println!(
                "\n✔ {}ファイルを統合: {} (ラベル{}種)",
                inputs.len(),
                output_path.display(),
                session.labels().len()
            );
        }

        Commands::Stats { input, images } => {
            let mut session = Session::new(false);
            import_into(&mut session, &input, images.as_deref())?;

            let stats = export_stats(&session.images_for_export());
            println!("\n集計:");
            println!("  画像: {}", stats.total_images);
            println!("  アノテーション: {}", stats.total_annotations);
            println!("  アノテーションあり: {}", stats.images_with_annotations);
            println!("  アノテーションなし: {}", stats.images_without_annotations);
            println!("  ラベル別:");
            for (label, count) in &stats.label_distribution {
                println!("    {}: {}", label, count);
            }
        }

        Commands::Labels { add, interactive, clear, show } => {
            let mut config = config;
            let mut labels = bbox_annotator_common::LabelManager::with_labels(config.labels.clone());
            let mut changed = false;

            if clear {
                labels.clear();
                changed = true;
                println!("✔ ラベルを削除しました");
            }

            for spec in &add {
                let (id, name) = config::parse_label_spec(spec)?;
                if labels.add(id, name.clone()) {
                    changed = true;
                    println!("✔ {}: {}", id, name);
                } else {
                    println!("✖ ID {} は既に \"{}\" で使われています", id, labels.get_name(id).unwrap_or_default());
                }
            }

            if interactive && prompt::run_interactive_labels(&mut labels)? > 0 {
                changed = true;
            }

            if changed {
                config.labels = labels.all().clone();
                config.save()?;
            }

            if show || (!changed && !interactive) {
                if labels.has_any() {
                    println!("ラベル:");
                    for (id, name) in labels.sorted() {
                        println!("  {}: {}", id, name);
                    }
                } else {
                    println!("ラベルが定義されていません。`bbox-annotate labels --add 1=cat` で追加してください");
                }
            }
        }
    }

    Ok(())
}
