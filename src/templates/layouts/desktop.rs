use maud::{html, Markup, PreEscaped, DOCTYPE};

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; color: #1e293b; background: #f8fafc; }
header { display: flex; align-items: center; justify-content: space-between; padding: 0.75rem 1.5rem; background: #fff; box-shadow: 0 1px 3px rgba(0,0,0,0.1); }
header nav ul { display: flex; gap: 1rem; list-style: none; margin: 0; padding: 0; }
main { max-width: 1100px; margin: 1.5rem auto; padding: 0 1rem; }
.tiles { display: grid; grid-template-columns: repeat(4, 1fr); gap: 1rem; }
.tile { background: #fff; border-radius: 8px; padding: 1rem; border-top: 4px solid var(--accent); }
.tile .value { font-size: 1.8rem; font-weight: 700; }
.card { background: #fff; border-radius: 8px; padding: 1rem; margin: 1rem 0; }
.alert { border-radius: 8px; padding: 1rem; margin: 1rem 0; background: #e0f2fe; }
.alert.highlight { background: #fee2e2; border: 2px solid #dc2626; }
.tag { display: inline-block; color: #fff; border-radius: 999px; padding: 0.1rem 0.6rem; margin: 0.15rem; font-size: 0.85rem; }
.tag.flagged { outline: 2px solid #dc2626; font-weight: 700; }
.error { color: #dc2626; }
table { border-collapse: collapse; width: 100%; font-size: 0.85rem; }
th, td { border-bottom: 1px solid #e2e8f0; padding: 0.3rem 0.5rem; text-align: right; }
th:first-child, td:first-child { text-align: left; }
"#;

pub fn desktop_layout(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="ja" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(STYLE)) }
            }
            body {
                header {
                    h3 { "SUUMO物件情報" }
                    nav {
                        ul {
                            li { a href="/" { "Dashboard" } }
                            li { a href="/export.xlsx" { "Excel" } }
                            li { a href="/export.json" { "JSON" } }
                        }
                    }
                }
                (content)
            }
        }
    }
}
