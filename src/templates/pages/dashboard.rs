use crate::dashboard::{DashboardView, LatestView};
use crate::db::fetch_runs::FetchRun;
use crate::domain::breakdown::SeriesSet;
use crate::domain::category::{color_for, IMMEDIATE_COLOR, NEGOTIABLE_COLOR};
use crate::domain::history::RangeSpec;
use crate::templates::components::{change_alert, empty_state, property_card, stat_tile};
use crate::templates::{card, desktop_layout};
use maud::{html, Markup};

const RANGES: [(RangeSpec, &str); 3] = [
    (RangeSpec::Days(7), "7日間"),
    (RangeSpec::Days(30), "30日間"),
    (RangeSpec::All, "全期間"),
];

const TOTAL_COLOR: &str = "rgba(59,130,246,0.7)";

pub fn dashboard_page(view: &DashboardView, runs: &[FetchRun]) -> Markup {
    desktop_layout(
        "SUUMO物件情報",
        html! {
            main {
                @match &view.latest {
                    Some(latest) => (latest_section(latest, &view.flagged_label)),
                    None => (empty_state("まだ取得データがありません。fetch を実行してください。")),
                }

                (series_section(&view.series, view.range))

                @if !runs.is_empty() {
                    (runs_section(runs))
                }
            }
        },
    )
}

fn latest_section(latest: &LatestView, flagged_label: &str) -> Markup {
    let s = &latest.summary;
    html! {
        p class="updated" { "最終更新: " (latest.date) " " (latest.time) }

        @if let Some(alert) = &latest.alert {
            (change_alert(alert))
        }

        section class="tiles" {
            (stat_tile("総物件数", s.total, TOTAL_COLOR))
            (stat_tile(&format!("{flagged_label}入居"), s.flagged, color_for(flagged_label)))
            (stat_tile("即入居可", s.immediate, IMMEDIATE_COLOR))
            (stat_tile("相談", s.negotiable, NEGOTIABLE_COLOR))
        }

        section class="properties" {
            @for p in &latest.cards {
                (property_card(p))
            }
        }
    }
}

fn short_timestamp(ts: &str) -> String {
    ts.get(..16).unwrap_or(ts).replace('T', " ")
}

fn series_section(series: &SeriesSet, selected: RangeSpec) -> Markup {
    card(
        "推移",
        html! {
            nav class="ranges" {
                @for (range, label) in RANGES {
                    @if range == selected {
                        strong { (label) } " "
                    } @else {
                        a href=(format!("/?range={range}")) { (label) } " "
                    }
                }
            }

            @if series.timestamps.is_empty() {
                p { "この期間のデータはありません。" }
            } @else {
                table id="series" {
                    thead {
                        tr {
                            th { "日時" }
                            @for p in &series.properties { th { (p.name) } }
                            th { "合計" }
                            @for c in &series.categories {
                                th style=(format!("color: {}", c.color)) { (c.label) }
                            }
                        }
                    }
                    tbody {
                        @for i in (0..series.timestamps.len()).rev() {
                            tr {
                                td { (short_timestamp(&series.timestamps[i])) }
                                @for p in &series.properties {
                                    td {
                                        @match p.counts[i] {
                                            Some(n) => (n),
                                            None => "-",
                                        }
                                    }
                                }
                                td { strong { (series.total[i]) } }
                                @for c in &series.categories { td { (c.counts[i]) } }
                            }
                        }
                    }
                }
            }
        },
    )
}

fn runs_section(runs: &[FetchRun]) -> Markup {
    card(
        "取得履歴",
        html! {
            table id="fetch-runs" {
                thead {
                    tr { th { "開始" } th { "成功" } th { "保存" } th { "エラー" } }
                }
                tbody {
                    @for run in runs {
                        tr {
                            td { (run.started_at.format("%Y-%m-%d %H:%M").to_string()) }
                            td {
                                @match run.properties_succeeded {
                                    Some(n) => { (n) " / " (run.properties_total) },
                                    None => "実行中",
                                }
                            }
                            td { @if run.saved { "✅" } @else { "—" } }
                            td class="error" { (run.error_message.as_deref().unwrap_or("")) }
                        }
                    }
                }
            }
        },
    )
}
