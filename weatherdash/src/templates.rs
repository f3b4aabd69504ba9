use std::fmt::Write;

use chrono::{DateTime, Utc};
use weatherdash_core::{DailyPoint, HourlyPoint, WeatherSnapshot, aggregate::offset_from_secs};

/// Values echoed back into the form inputs.
#[derive(Debug, Clone, Default)]
pub struct FormValues<'a> {
    pub city: &'a str,
    pub state: &'a str,
    pub country: &'a str,
}

/// Formats `ts` in the location's local time using a strftime pattern.
///
/// Falls back to the raw unix timestamp when the pattern can't be rendered.
pub fn format_timestamp(ts: DateTime<Utc>, utc_offset_secs: i32, fmt: &str) -> String {
    let local = ts.with_timezone(&offset_from_secs(utc_offset_secs));
    let mut out = String::new();
    match write!(out, "{}", local.format(fmt)) {
        Ok(()) => out,
        Err(_) => ts.timestamp().to_string(),
    }
}

/// The whole page: form, then the snapshot when there is one.
pub fn render_page(
    form: &FormValues<'_>,
    snapshot: Option<&WeatherSnapshot>,
    notice: Option<&str>,
) -> String {
    let mut content = render_form(form);

    if let Some(msg) = notice {
        content.push_str(&format!(r#"<p class="notice">{}</p>"#, html_escape(msg)));
    }
    if let Some(s) = snapshot {
        content.push_str(&render_snapshot(s));
    }

    build_page("Weather", &content)
}

fn render_form(form: &FormValues<'_>) -> String {
    format!(
        r#"<form method="post" action="/" class="search">
    <input name="city" placeholder="City" required value="{city}">
    <input name="state" placeholder="State code" value="{state}">
    <input name="country" placeholder="Country code" value="{country}">
    <button type="submit">Get weather</button>
</form>"#,
        city = html_escape(form.city),
        state = html_escape(form.state),
        country = html_escape(form.country),
    )
}

fn render_snapshot(s: &WeatherSnapshot) -> String {
    let offset = s.utc_offset_secs;
    let mut html = format!(
        r#"<section class="current">
    <h2>{name} <span class="tz">{tz}</span></h2>
    <div class="headline">{icon}<span class="temp">{temp}&deg;C</span>
        <span class="cond">{main}: {desc}</span></div>
    <dl class="metrics">
        <dt>Feels like</dt><dd>{feels}&deg;C</dd>
        <dt>Humidity</dt><dd>{hum}%</dd>
        <dt>Pressure</dt><dd>{pres} hPa</dd>
        <dt>Wind</dt><dd>{wind} m/s</dd>
        <dt>Visibility</dt><dd>{vis} m</dd>
        <dt>UV index</dt><dd>{uv:.1}</dd>
        <dt>Sunrise</dt><dd>{rise}</dd>
        <dt>Sunset</dt><dd>{set}</dd>
    </dl>
</section>"#,
        name = html_escape(&s.name),
        tz = html_escape(&s.timezone),
        icon = icon_img(&s.icon, &s.description),
        temp = s.temperature_c,
        main = html_escape(&s.main),
        desc = html_escape(&s.description),
        feels = s.feels_like_c,
        hum = s.humidity_pct,
        pres = s.pressure_hpa,
        wind = s.wind_speed_mps,
        vis = s.visibility_m,
        uv = s.uv_index,
        rise = format_timestamp(s.sunrise, offset, "%H:%M"),
        set = format_timestamp(s.sunset, offset, "%H:%M"),
    );

    if !s.hourly.is_empty() {
        let cells: String = s.hourly.iter().map(|h| hourly_cell(h, offset)).collect();
        html.push_str(&format!(
            r#"<section class="hourly"><h3>Next 24 hours</h3><div class="row">{cells}</div></section>"#
        ));
    }

    if !s.daily.is_empty() {
        let rows: String = s.daily.iter().map(|d| daily_row(d, offset)).collect();
        html.push_str(&format!(
            r#"<section class="daily"><h3>Daily forecast</h3><table>{rows}</table></section>"#
        ));
    }

    html.push_str(&format!(
        r#"<p class="updated">Last updated {}</p>"#,
        format_timestamp(s.captured_at, offset, "%Y-%m-%d %H:%M")
    ));
    html
}

fn hourly_cell(h: &HourlyPoint, offset: i32) -> String {
    format!(
        r#"<div class="cell"><div>{time}</div>{icon}<div>{temp:.0}&deg;</div><div class="pop">{pop:.0}%</div></div>"#,
        time = format_timestamp(h.time, offset, "%H:%M"),
        icon = icon_img(&h.icon, &h.description),
        temp = h.temp,
        pop = h.precipitation,
    )
}

fn daily_row(d: &DailyPoint, offset: i32) -> String {
    format!(
        r#"<tr><td>{day}</td><td>{icon}</td><td>{desc}</td><td>{max:.0}&deg; / {min:.0}&deg;</td><td>{hum}%</td><td>{wind:.1} m/s</td><td>{pop:.0}%</td></tr>"#,
        day = format_timestamp(d.time, offset, "%a, %b %d"),
        icon = icon_img(&d.icon, &d.description),
        desc = html_escape(&d.description),
        max = d.temp_max,
        min = d.temp_min,
        hum = d.humidity,
        wind = d.wind_speed,
        pop = d.precipitation,
    )
}

fn icon_img(icon: &str, alt: &str) -> String {
    if icon.is_empty() {
        return String::new();
    }
    format!(
        r#"<img src="https://openweathermap.org/img/wn/{}@2x.png" alt="{}" width="50" height="50">"#,
        html_escape(icon),
        html_escape(alt)
    )
}

fn build_page(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | weatherdash</title>
<style>
*{{margin:0;padding:0;box-sizing:border-box;}}
body{{font-family:-apple-system,BlinkMacSystemFont,"Segoe UI",Roboto,sans-serif;color:#1a1a1a;background:#f4f7fb;}}
.container{{max-width:960px;margin:0 auto;padding:24px;}}
.search{{display:flex;gap:8px;margin-bottom:24px;}}
.search input{{padding:8px;border:1px solid #ccc;border-radius:4px;flex:1;}}
.search button{{padding:8px 16px;background:#0066cc;color:#fff;border:none;border-radius:4px;}}
.notice{{background:#fff8e1;border:1px solid #ffecb3;padding:8px 12px;border-radius:4px;color:#795548;margin-bottom:16px;}}
section{{background:#fff;border:1px solid #e0e0e0;border-radius:8px;padding:16px;margin-bottom:16px;}}
.headline{{display:flex;align-items:center;gap:12px;}}
.temp{{font-size:32px;font-weight:600;}}
.metrics{{display:grid;grid-template-columns:1fr 1fr 1fr 1fr;gap:6px;margin-top:12px;font-size:13px;}}
.metrics dt{{color:#888;}}
.hourly .row{{display:flex;gap:8px;overflow-x:auto;}}
.hourly .cell{{text-align:center;font-size:13px;min-width:64px;}}
.pop{{color:#1565c0;}}
.daily table{{width:100%;font-size:14px;border-collapse:collapse;}}
.daily td{{padding:4px 8px;border-top:1px solid #eee;}}
.updated{{font-size:12px;color:#888;}}
</style>
</head>
<body>
<div class="container">
<h1>{title}</h1>
{content}
</div>
</body>
</html>"#
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
