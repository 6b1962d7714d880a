use chrono::{DateTime, Utc};

/// Memory summary line under the diagram, in whole-ish megabytes the way
/// operators read quotas: "50 / 100 MB".
pub fn format_mb(used: u64, size: u64) -> String {
    const MB: f64 = 1024.0 * 1024.0;
    format!(
        "{} / {} MB",
        trim_trailing(used as f64 / MB),
        trim_trailing(size as f64 / MB)
    )
}

fn trim_trailing(v: f64) -> String {
    if (v - v.round()).abs() < 1e-9 {
        format!("{}", v.round() as i64)
    } else {
        format!("{:.1}", v)
    }
}

pub fn human_time(t: Option<DateTime<Utc>>) -> String {
    let t = match t {
        Some(t) => t,
        None => return "never".to_string(),
    };

    let d = Utc::now() - t;
    let secs = d.num_seconds();

    if secs < 60 {
        "just now".to_string()
    } else if secs < 3600 {
        let m = d.num_minutes();
        if m == 1 {
            "1 minute ago".to_string()
        } else {
            format!("{} minutes ago", m)
        }
    } else if secs < 86400 {
        let h = d.num_hours();
        if h == 1 {
            "1 hour ago".to_string()
        } else {
            format!("{} hours ago", h)
        }
    } else {
        t.format("%b %e, %Y").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mb_summary_reads_like_a_quota() {
        assert_eq!(format_mb(52428800, 104857600), "50 / 100 MB");
        assert_eq!(format_mb(0, 104857600), "0 / 100 MB");
        assert_eq!(format_mb(1572864, 104857600), "1.5 / 100 MB");
    }

    #[test]
    fn recent_times_humanize() {
        assert_eq!(human_time(None), "never");
        assert_eq!(human_time(Some(Utc::now())), "just now");
        let five_min = Utc::now() - chrono::Duration::minutes(5);
        assert_eq!(human_time(Some(five_min)), "5 minutes ago");
    }
}
