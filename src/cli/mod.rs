//! Terminal rendering helpers for the catalog CLI.

use terminal_size::{terminal_size, Height, Width};

use crate::model::{Movie, User};

// Render a movie list as an ASCII table sized to the terminal.
// Returns true if a table was printed, false for an empty list (callers
// fall back to a plain message).
pub fn print_movie_table(movies: &[Movie], favorites: &[String]) -> bool {
    if movies.is_empty() {
        return false;
    }

    let termw = get_terminal_width();
    crate::tprintln!("[cli] detected terminal width={} columns", termw);

    let cols = ["", "Title", "Genre", "Director", "Id"];
    let rows: Vec<Vec<String>> = movies
        .iter()
        .map(|m| {
            vec![
                if favorites.contains(&m.id) { "*".to_string() } else { String::new() },
                m.title.clone(),
                m.genre.name.clone(),
                m.director.name.clone(),
                m.id.clone(),
            ]
        })
        .collect();

    let mut widths: Vec<usize> = cols.iter().map(|s| s.chars().count().min(termw)).collect();
    for r in &rows {
        for (i, cell) in r.iter().enumerate().take(cols.len()) {
            let w = display_len(cell);
            if w > widths[i] {
                widths[i] = w.min(termw);
            }
        }
    }

    let sep = build_separator(&widths);
    println!("{}", fit_line_to_width(&sep, termw));
    let header: Vec<String> = cols.iter().map(|s| s.to_string()).collect();
    println!("{}", fit_line_to_width(&build_row(&header, &widths), termw));
    println!("{}", fit_line_to_width(&sep, termw));
    for r in &rows {
        println!("{}", fit_line_to_width(&build_row(r, &widths), termw));
    }
    println!("{}", fit_line_to_width(&sep, termw));
    println!("movies: {} (* = favorite)", rows.len());

    true
}

pub fn print_profile(user: &User) {
    println!("username: {}", user.username);
    if let Some(email) = &user.email {
        println!("email:    {}", email);
    }
    if let Some(birthday) = &user.birthday {
        println!("birthday: {}", birthday.date_naive());
    }
    if user.favorite_movies.is_empty() {
        println!("favorites: (none)");
    } else {
        println!("favorites: {}", user.favorite_movies.join(", "));
    }
}

fn get_terminal_width() -> usize {
    let size = terminal_size();
    if let Some((Width(w), Height(_h))) = size {
        return (w.saturating_sub(4)) as usize;
    }
    80
}

fn display_len(s: &str) -> usize {
    s.chars().count()
}

fn build_separator(widths: &[usize]) -> String {
    let mut s = String::new();
    s.push('+');
    for w in widths {
        s.push_str(&"-".repeat(*w + 2));
        s.push('+');
    }
    s
}

fn build_row(cells: &[String], widths: &[usize]) -> String {
    let mut s = String::new();
    s.push('|');
    for (i, w) in widths.iter().enumerate() {
        let cell = cells.get(i).cloned().unwrap_or_default();
        let text = truncate(&cell, *w);
        s.push(' ');
        s.push_str(&text);
        let pad = w.saturating_sub(display_len(&text));
        s.push_str(&" ".repeat(pad));
        s.push(' ');
        s.push('|');
    }
    s
}

fn truncate(s: &str, max: usize) -> String {
    let len = s.chars().count();
    if len <= max {
        return s.to_string();
    }
    if max <= 1 {
        return "…".to_string();
    }
    s.chars().take(max - 1).collect::<String>() + "…"
}

fn fit_line_to_width(s: &str, maxw: usize) -> String {
    if display_len(s) <= maxw {
        return s.to_string();
    }
    truncate(s, maxw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_marks_cut_cells() {
        assert_eq!(truncate("Casablanca", 20), "Casablanca");
        assert_eq!(truncate("Casablanca", 5), "Casa…");
        assert_eq!(truncate("Casablanca", 1), "…");
    }

    #[test]
    fn row_pads_to_column_widths() {
        let row = build_row(&["a".into(), "bb".into()], &[3, 4]);
        assert_eq!(row, "| a   | bb   |");
    }

    #[test]
    fn separator_matches_widths() {
        assert_eq!(build_separator(&[1, 2]), "+---+----+");
    }

    #[test]
    fn empty_list_prints_nothing() {
        assert!(!print_movie_table(&[], &[]));
    }
}
