//! `spark personas`: the investor persona catalog.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use sparkai_core::persona;

pub fn list_personas(json: bool) -> Result<()> {
    let personas = persona::all();

    if json {
        println!("{}", serde_json::to_string_pretty(personas)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("ID").fg(Color::White),
        Cell::new("Name").fg(Color::White),
        Cell::new("Role").fg(Color::White),
        Cell::new("Style").fg(Color::White),
    ]);

    for p in personas {
        table.add_row(vec![
            Cell::new(p.id).fg(Color::Yellow),
            Cell::new(format!("{} {}", p.avatar, p.name)).fg(Color::Cyan),
            Cell::new(format!("{} @ {}", p.role, p.company)).fg(Color::White),
            Cell::new(p.style_summary).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {}",
        style("Use /persona <id> in chat, or: spark chat --persona <id>").dim()
    );
    println!();

    Ok(())
}
