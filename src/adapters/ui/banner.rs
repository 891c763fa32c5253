//! ASCII banner (APR) with a vertical gradient.

use crossterm::ExecutableCommand;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use figlet_rs::FIGfont;
use std::io::{Write, stdout};

/// Clinical blue (#009fe3).
const CLINICAL_BLUE: (u8, u8, u8) = (0x00, 0x9f, 0xe3);
/// Mint green (#7ef29d).
const MINT_GREEN: (u8, u8, u8) = (0x7e, 0xf2, 0x9d);

/// Linear interpolation between two RGB colors. `t` in [0.0, 1.0].
fn lerp_rgb(a: (u8, u8, u8), b: (u8, u8, u8), t: f64) -> (u8, u8, u8) {
    let r = (f64::from(a.0) * (1.0 - t) + f64::from(b.0) * t).round() as u8;
    let g = (f64::from(a.1) * (1.0 - t) + f64::from(b.1) * t).round() as u8;
    let bl = (f64::from(a.2) * (1.0 - t) + f64::from(b.2) * t).round() as u8;
    (r, g, bl)
}

/// Prints "APR" in figlet's standard font with a blue-to-green gradient,
/// then the version and a subtitle line.
pub fn print_welcome() {
    let mut out = stdout();
    let Ok(font) = FIGfont::standard() else {
        println!("APR CONSOLE");
        return;
    };
    let Some(figure) = font.convert("APR") else {
        println!("APR CONSOLE");
        return;
    };
    let art = figure.to_string();
    let lines: Vec<&str> = art.lines().collect();
    let total = lines.len().max(1);

    for (i, line) in lines.iter().enumerate() {
        let t = if total <= 1 {
            1.0
        } else {
            i as f64 / (total - 1) as f64
        };
        let (r, g, b) = lerp_rgb(CLINICAL_BLUE, MINT_GREEN, t);
        let _ = out.execute(SetForegroundColor(Color::Rgb { r, g, b }));
        let _ = out.execute(Print(line));
        let _ = out.execute(Print("\r\n"));
        let _ = out.execute(ResetColor);
    }

    let version = env!("CARGO_PKG_VERSION");
    let _ = out.execute(SetForegroundColor(Color::Rgb {
        r: MINT_GREEN.0,
        g: MINT_GREEN.1,
        b: MINT_GREEN.2,
    }));
    let _ = out.execute(Print(format!("v{version}\r\n")));
    let _ = out.execute(Print("Pharmaceutical Quality Analytics\r\n"));
    let _ = out.execute(ResetColor);
    let _ = out.flush();
}
