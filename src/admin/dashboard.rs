//! HTML dashboard for the admin listener.

use std::fmt::Write;

use crate::load_balancer::pool::PoolSnapshot;

pub fn render_dashboard(snapshot: &PoolSnapshot) -> String {
    let mut rows = String::new();
    for b in &snapshot.backends {
        let (class, label) = if b.alive { ("up", "alive") } else { ("down", "down") };
        let marker = if b.index == snapshot.cursor { " &larr; next" } else { "" };
        let _ = write!(
            rows,
            r#"<tr><td>{index}</td><td>{address}{marker}</td><td>{weight}</td><td class="{class}">{label}</td>
<td><form method="post" action="/remove_instance"><input type="hidden" name="index" value="{index}"><button>Remove</button></form></td></tr>
"#,
            index = b.index,
            address = escape(&b.address),
            weight = b.weight,
        );
    }
    if snapshot.backends.is_empty() {
        rows.push_str("<tr><td colspan=\"5\">Pool is empty</td></tr>\n");
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>rr-balancer</title>
<style>
body {{ font-family: sans-serif; margin: 2em; }}
table {{ border-collapse: collapse; }}
td, th {{ border: 1px solid #ccc; padding: 4px 10px; }}
.up {{ color: #1a7f37; }}
.down {{ color: #cf222e; }}
</style>
</head>
<body>
<h1>Backend pool</h1>
<p>Live backends: {live}/{total}. Cursor: {cursor}.</p>
<table>
<tr><th>#</th><th>Address</th><th>Weight</th><th>Status</th><th></th></tr>
{rows}</table>
<h2>Add backend</h2>
<form method="post" action="/add_instance">
<input name="ip" placeholder="localhost">
<input name="port" placeholder="5003">
<button>Add</button>
</form>
</body>
</html>
"#,
        live = snapshot.live,
        total = snapshot.total,
        cursor = snapshot.cursor,
        rows = rows,
    )
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
