use crate::statistic::Statistic;
use crate::stats::{average_age, gender_counts, pro_user_count, total_matches, user_count};
use crate::user::User;

/// Shown in place of an average when the area has no users.
pub const NO_DATA: &str = "N/A";

/// Tooltip HTML for an area under the given statistic. Only the selected
/// aggregate is computed.
pub fn tooltip_html(area_name: &str, statistic: Statistic, users: &[User]) -> String {
    let mut html = format!("Area Name: <strong>{}</strong> <br /> ", escape_html(area_name));
    let line = match statistic {
        Statistic::Age => match average_age(users) {
            Some(age) => format!("Avg. age of users: {age} yrs"),
            None => format!("Avg. age of users: {NO_DATA}"),
        },
        Statistic::Users => format!("Number of users: {}", user_count(users)),
        Statistic::Match => format!("Total number of matches: {}", total_matches(users)),
        Statistic::Gender => {
            let counts = gender_counts(users);
            format!(
                "Total number of females: {} <br /> Total number of males: {}",
                counts.female, counts.male
            )
        }
        Statistic::ProUsers => format!("Total number of Pro Users: {}", pro_user_count(users)),
    };
    html.push_str(&line);
    html
}

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::{escape_html, tooltip_html};
    use crate::statistic::Statistic;
    use crate::user::{Gender, User};

    fn user(age: f64, gender: &str, is_pro_user: bool, total_matches: u64) -> User {
        User {
            user_id: "u".to_string(),
            area_id: 1,
            age,
            gender: Gender::from(gender),
            is_pro_user,
            total_matches,
        }
    }

    fn sample() -> Vec<User> {
        vec![
            user(20.0, "M", true, 5),
            user(21.0, "F", false, 3),
            user(40.0, "X", true, 1),
        ]
    }

    #[test]
    fn formats_each_statistic() {
        let users = sample();
        assert_eq!(
            tooltip_html("Koramangala", Statistic::Age, &users),
            "Area Name: <strong>Koramangala</strong> <br /> Avg. age of users: 27 yrs"
        );
        assert_eq!(
            tooltip_html("Koramangala", Statistic::Users, &users),
            "Area Name: <strong>Koramangala</strong> <br /> Number of users: 3"
        );
        assert_eq!(
            tooltip_html("Koramangala", Statistic::Match, &users),
            "Area Name: <strong>Koramangala</strong> <br /> Total number of matches: 9"
        );
        assert_eq!(
            tooltip_html("Koramangala", Statistic::Gender, &users),
            "Area Name: <strong>Koramangala</strong> <br /> Total number of females: 1 <br /> Total number of males: 1"
        );
        assert_eq!(
            tooltip_html("Koramangala", Statistic::ProUsers, &users),
            "Area Name: <strong>Koramangala</strong> <br /> Total number of Pro Users: 2"
        );
    }

    #[test]
    fn empty_area_shows_no_data_for_age() {
        assert_eq!(
            tooltip_html("Empty", Statistic::Age, &[]),
            "Area Name: <strong>Empty</strong> <br /> Avg. age of users: N/A"
        );
        assert!(tooltip_html("Empty", Statistic::Users, &[]).ends_with("Number of users: 0"));
    }

    #[test]
    fn area_names_are_escaped() {
        assert_eq!(escape_html("A & <B>"), "A &amp; &lt;B&gt;");
        assert!(tooltip_html("<script>", Statistic::Users, &[]).contains("&lt;script&gt;"));
    }
}
