use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::clock::Clock;
use crate::core::validation::ValidationService;
use crate::db::pool::DbPool;
use crate::db::queries::load_shifts_for_employee_on_date;
use crate::errors::AppResult;
use crate::utils::colors::{GREY, GREEN, RESET};

fn flag(ok: bool) -> String {
    if ok {
        format!("{GREEN}yes{RESET}")
    } else {
        format!("{GREY}no{RESET}")
    }
}

pub fn handle(cmd: &Commands, cfg: &Config, clock: &dyn Clock) -> AppResult<()> {
    if let Commands::Eligibility { employee } = cmd {
        let pool = DbPool::new(&cfg.database)?;
        let today = clock.now().date();
        let shifts = load_shifts_for_employee_on_date(&pool.conn, *employee, &today)?;

        let service = ValidationService::new(clock, cfg.clock_in_eligibility_window());
        let e = service.evaluate(&pool.conn, &shifts)?;

        println!("clock in:        {}", flag(e.can_clock_in));
        println!("mandatory break: {}", flag(e.can_take_mandatory_break));
        println!("break:           {}", flag(e.can_take_break));
    }

    Ok(())
}
