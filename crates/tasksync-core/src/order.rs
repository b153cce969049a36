//! Task list ordering
//!
//! Open tasks come before completed ones; within each group tasks are ordered
//! by their deadline text. Deadlines are compared as plain strings, so
//! `dd/mm/yyyy` values sort by day-of-month first and do not follow the
//! calendar (`"05/01/2024"` sorts before `"25/12/2023"`).

use std::cmp::Ordering;

use crate::models::Task;

/// Compare two tasks by `(completed, deadline)`
pub fn compare(a: &Task, b: &Task) -> Ordering {
    a.completed
        .cmp(&b.completed)
        .then_with(|| a.deadline.cmp(&b.deadline))
}

/// Sort tasks in place; ties keep their current relative order
pub fn sort_tasks(tasks: &mut [Task]) {
    tasks.sort_by(compare);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: &str, deadline: &str, completed: bool) -> Task {
        let mut task = Task::new(Some(id.to_string()), id, "", deadline);
        task.completed = completed;
        task
    }

    fn ids(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.id.as_deref().unwrap()).collect()
    }

    #[test]
    fn test_open_before_completed() {
        let mut tasks = vec![
            task("done", "01/01/2020", true),
            task("open", "31/12/2099", false),
        ];
        sort_tasks(&mut tasks);
        assert_eq!(ids(&tasks), vec!["open", "done"]);
    }

    #[test]
    fn test_deadline_is_compared_as_text() {
        let mut tasks = vec![
            task("december", "25/12/2023", false),
            task("january", "05/01/2024", false),
        ];
        sort_tasks(&mut tasks);
        // Later in the calendar, but '0' < '2'
        assert_eq!(ids(&tasks), vec!["january", "december"]);
    }

    #[test]
    fn test_ties_keep_snapshot_order() {
        let mut tasks = vec![
            task("c", "01/02/2030", false),
            task("a", "01/02/2030", false),
            task("b", "01/02/2030", false),
            task("z", "01/01/2030", true),
            task("y", "01/01/2030", true),
        ];
        sort_tasks(&mut tasks);
        assert_eq!(ids(&tasks), vec!["c", "a", "b", "z", "y"]);
    }

    #[test]
    fn test_compare() {
        let open = task("a", "10/10/2030", false);
        let done = task("b", "01/01/2030", true);
        assert_eq!(compare(&open, &done), Ordering::Less);
        assert_eq!(compare(&done, &open), Ordering::Greater);
        assert_eq!(compare(&open, &open.clone()), Ordering::Equal);
    }

    #[test]
    fn test_empty_deadline_sorts_first() {
        let mut tasks = vec![task("dated", "01/01/2030", false), task("blank", "", false)];
        sort_tasks(&mut tasks);
        assert_eq!(ids(&tasks), vec!["blank", "dated"]);
    }
}
