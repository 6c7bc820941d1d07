use colored::Colorize;

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a section header
pub fn section(title: &str) {
    println!();
    println!("{}", title.cyan().bold());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Print one item row: a colored marker, fixed-width columns, then the name
pub fn item_row(delete: bool, columns: &[String], name: &str) {
    let marker = if delete {
        "delete".red().bold()
    } else {
        "keep  ".green()
    };
    let columns: Vec<String> = columns.iter().map(|c| format!("{c:>10}")).collect();
    println!("  {} {}  {}", marker, columns.join(" ").dimmed(), truncate_name(name, 60));
}

/// Truncate an item name for display, keeping the start
pub fn truncate_name(name: &str, max_chars: usize) -> String {
    if name.chars().count() <= max_chars {
        name.to_string()
    } else if max_chars <= 3 {
        "...".to_string()
    } else {
        let kept: String = name.chars().take(max_chars - 3).collect();
        format!("{kept}...")
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_name_short() {
        assert_eq!(truncate_name("short", 20), "short");
        assert_eq!(truncate_name("exact", 5), "exact");
    }

    #[test]
    fn test_truncate_name_long() {
        assert_eq!(
            truncate_name("[Movies] A Very Long Release-CHD", 15),
            "[Movies] A V..."
        );
    }

    #[test]
    fn test_truncate_name_multibyte() {
        assert_eq!(truncate_name("电影电影电影电影", 6), "电影电...");
    }

    #[test]
    fn test_truncate_name_edge_cases() {
        assert_eq!(truncate_name("test", 3), "...");
        assert_eq!(truncate_name("", 10), "");
    }
}
