//! Named sort strategies for employee listings.

use crate::model::employee::Employee;
use std::cmp::Ordering;

/// Employee sort policies exposed by the employee service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmployeeOrdering {
    /// Name ascending by code point, then joining date ascending.
    NameThenJoiningDate,
    /// Salary ascending.
    Salary,
}

impl EmployeeOrdering {
    pub fn compare(self, left: &Employee, right: &Employee) -> Ordering {
        match self {
            Self::NameThenJoiningDate => compare_name_then_joining_date(left, right),
            Self::Salary => compare_salary(left, right),
        }
    }

    /// Stable in-place sort; full ties keep their incoming order.
    pub fn sort(self, employees: &mut [Employee]) {
        employees.sort_by(|left, right| self.compare(left, right));
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::NameThenJoiningDate => "name_then_joining_date",
            Self::Salary => "salary",
        }
    }
}

/// Case-sensitive name order, joining date breaks ties.
pub fn compare_name_then_joining_date(left: &Employee, right: &Employee) -> Ordering {
    left.name
        .cmp(&right.name)
        .then_with(|| left.joining_date.cmp(&right.joining_date))
}

pub fn compare_salary(left: &Employee, right: &Employee) -> Ordering {
    left.salary.total_cmp(&right.salary)
}
