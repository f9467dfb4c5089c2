use crate::regno::extract_last_two_digits;

/// Younger employees per department, ordered by employee id descending
pub const YOUNGER_EMPLOYEES_QUERY: &str = "SELECT
    e1.EMP_ID,
    e1.FIRST_NAME,
    e1.LAST_NAME,
    d.DEPARTMENT_NAME,
    COUNT(e2.EMP_ID) AS YOUNGER_EMPLOYEES_COUNT
FROM EMPLOYEE e1
JOIN DEPARTMENT d
    ON e1.DEPARTMENT = d.DEPARTMENT_ID
LEFT JOIN EMPLOYEE e2
    ON e1.DEPARTMENT = e2.DEPARTMENT
   AND e2.DOB > e1.DOB
GROUP BY e1.EMP_ID, e1.FIRST_NAME, e1.LAST_NAME, d.DEPARTMENT_NAME
ORDER BY e1.EMP_ID DESC;
";

/// Odd registration numbers have no answer yet; submitted as-is
// TODO: replace with the odd-numbered question's query once it is published
pub const ODD_PLACEHOLDER_QUERY: &str = "SELECT 1;";

/// Parity of the registration number's selector digits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    Even,
    Odd,
}

impl Parity {
    #[must_use]
    pub fn of(value: u32) -> Self {
        if value % 2 == 0 {
            Self::Even
        } else {
            Self::Odd
        }
    }

    /// Parity of the digits extracted from a registration number
    #[must_use]
    pub fn from_reg_no(reg_no: &str) -> Self {
        Self::of(extract_last_two_digits(reg_no))
    }
}

/// Map a parity to its fixed query text
#[must_use]
pub fn select_query(parity: Parity) -> &'static str {
    match parity {
        Parity::Even => YOUNGER_EMPLOYEES_QUERY,
        Parity::Odd => ODD_PLACEHOLDER_QUERY,
    }
}
