//! Demo entry point for the debtor store.
//!
//! Seeds four debtors, each in its own unit of work, then replaces debtor 4
//! and prints it before and after. Repository errors are printed and the
//! run continues; the process never exits with a panic on store failures.

use dluznik_core::{init_logging, AppConfig, Debt, Debtor, DebtorId, DebtorService, RepoResult};
use log::{info, warn};

fn main() {
    let config = AppConfig::from_env();
    if let Err(err) = init_logging(&config.logging) {
        eprintln!("logging disabled: {err}");
    }
    info!(
        "event=demo_start module=cli status=start db_path={} version={}",
        config.store.db_path.display(),
        dluznik_core::core_version()
    );

    let service = DebtorService::new(config.store);

    for debtor in seed_debtors() {
        report(service.add(&debtor));
    }

    print_debtor(&service, 4);
    report(service.update(&updated_debtor()));
    print_debtor(&service, 4);
}

fn seed_debtors() -> Vec<Debtor> {
    vec![
        Debtor::new(1, "Jan", "Kowalski").with_debts([
            Debt::new("kredyt hipoteczny", 200_000),
            Debt::new("karta kredytowa", 300),
        ]),
        Debtor::new(2, "Zygmunt", "Nowak").with_debts([
            Debt::new("kredyt hipoteczny", 154_600),
            Debt::new("faktura", 1_500),
        ]),
        Debtor::new(3, "Elżbieta", "Ogonek").with_debts([Debt::new("leasing", 37_250)]),
        Debtor::new(4, "Marcin", "Kowal").with_debts([
            Debt::new("pożyczka", 3_400),
            Debt::new("zakupy ratalne", 2_000),
            Debt::new("faktury", 300),
        ]),
    ]
}

fn updated_debtor() -> Debtor {
    Debtor::new(4, "Marcin", "Kowal").with_debts([
        Debt::new("pożyczka", 3_000),
        Debt::new("zakupy ratalne", 2_100),
        Debt::new("faktury", 400),
    ])
}

fn print_debtor(service: &DebtorService, id: DebtorId) {
    match service.get_by_id(id) {
        Ok(Some(debtor)) => println!("{debtor}"),
        Ok(None) => println!("debtor {id} not found"),
        Err(err) => report::<()>(Err(err)),
    }
}

fn report<T>(result: RepoResult<T>) {
    if let Err(err) = result {
        warn!("event=demo_step module=cli status=error error={err}");
        println!("{err}");
    }
}
