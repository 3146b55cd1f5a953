//! Employees command for registering and listing employees.

use std::io::Write;

use anyhow::Result;
use attend_core::{Employee, EmployeeId};
use attend_db::Database;

pub fn add<W: Write>(
    writer: &mut W,
    db: &mut Database,
    id: &str,
    name: &str,
    department: Option<String>,
    position: Option<String>,
) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("employee name cannot be empty");
    }
    let employee = Employee {
        id: EmployeeId::new(id)?,
        name: name.to_string(),
        department,
        position,
    };
    if !db.add_employee(&employee)? {
        anyhow::bail!("employee {} already exists", employee.id);
    }
    writeln!(writer, "Added employee {} ({})", employee.id, employee.name)?;
    Ok(())
}

pub fn list<W: Write>(writer: &mut W, db: &Database, json: bool) -> Result<()> {
    let employees = db.list_employees()?;

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&employees)?)?;
        return Ok(());
    }

    if employees.is_empty() {
        writeln!(writer, "No employees registered.")?;
        writeln!(writer)?;
        writeln!(
            writer,
            "Hint: Run 'attend employees add <id> --name <name>' to register one."
        )?;
        return Ok(());
    }

    for employee in &employees {
        let details: Vec<&str> = [&employee.department, &employee.position]
            .into_iter()
            .filter_map(Option::as_deref)
            .collect();
        if details.is_empty() {
            writeln!(writer, "{}  {}", employee.id, employee.name)?;
        } else {
            writeln!(
                writer,
                "{}  {} ({})",
                employee.id,
                employee.name,
                details.join(", ")
            )?;
        }
    }
    Ok(())
}
