use dluznik_core::{
    Amount, Debt, Debtor, DebtorRepository, RepoError, SqliteDebtorRepository, UnitOfWork, WriteOp,
    WriteTarget,
};
use std::collections::HashSet;
use std::error::Error;
use std::str::FromStr;

fn jan_kowalski() -> Debtor {
    Debtor::new(1, "Jan", "Kowalski").with_debts([
        Debt::new("kredyt hipoteczny", 200_000),
        Debt::new("karta kredytowa", 300),
    ])
}

fn debt_set(debtor: &Debtor) -> HashSet<(String, Amount)> {
    debtor
        .debts
        .iter()
        .map(|debt| (debt.name.clone(), debt.amount))
        .collect()
}

#[test]
fn add_and_get_roundtrip() {
    let scope = UnitOfWork::open_in_memory().unwrap();
    let repo = SqliteDebtorRepository::new(scope.connection());

    let debtor = jan_kowalski();
    repo.add(&debtor).unwrap();

    let loaded = repo.get_by_id(1).unwrap().unwrap();
    assert_eq!(loaded.id, 1);
    assert_eq!(loaded.first_name, "Jan");
    assert_eq!(loaded.last_name, "Kowalski");
    assert_eq!(loaded.total_amount, Amount::from(200_300));
    assert_eq!(debt_set(&loaded), debt_set(&debtor));
}

#[test]
fn debtor_without_debts_roundtrips() {
    let scope = UnitOfWork::open_in_memory().unwrap();
    let repo = SqliteDebtorRepository::new(scope.connection());

    repo.add(&Debtor::new(9, "Anna", "Lis")).unwrap();

    let loaded = repo.get_by_id(9).unwrap().unwrap();
    assert!(loaded.debts.is_empty());
    assert_eq!(loaded.total_amount, Amount::ZERO);
}

#[test]
fn debts_come_back_in_insertion_order() {
    let scope = UnitOfWork::open_in_memory().unwrap();
    let repo = SqliteDebtorRepository::new(scope.connection());

    let debtor = Debtor::new(4, "Marcin", "Kowal").with_debts([
        Debt::new("pożyczka", 3_400),
        Debt::new("zakupy ratalne", 2_000),
        Debt::new("faktury", 300),
    ]);
    repo.add(&debtor).unwrap();

    let loaded = repo.get_by_id(4).unwrap().unwrap();
    assert_eq!(loaded.debts, debtor.debts);
}

#[test]
fn fractional_amounts_roundtrip() {
    let scope = UnitOfWork::open_in_memory().unwrap();
    let repo = SqliteDebtorRepository::new(scope.connection());

    let debtor = Debtor::new(6, "Ewa", "Mazur").with_debts([
        Debt::new("abonament", Amount::from_str("99.99").unwrap()),
        Debt::new("opłata", Amount::from_str("0.01").unwrap()),
    ]);
    repo.add(&debtor).unwrap();

    let loaded = repo.get_by_id(6).unwrap().unwrap();
    assert_eq!(loaded.total_amount, Amount::from(100));
    assert_eq!(loaded.debts, debtor.debts);
}

#[test]
fn real_values_written_outside_the_repository_are_readable() {
    let scope = UnitOfWork::open_in_memory().unwrap();
    scope
        .connection()
        .execute_batch(
            "INSERT INTO Debtor (id, first_name, last_name, total_amount)
                VALUES (3, 'Elżbieta', 'Ogonek', 37300.5);
             INSERT INTO Debt (name, amount, debtor_id) VALUES ('leasing', 37250.5, 3);
             INSERT INTO Debt (name, amount, debtor_id) VALUES ('faktura', '50', 3);",
        )
        .unwrap();

    let loaded = SqliteDebtorRepository::new(scope.connection())
        .get_by_id(3)
        .unwrap()
        .unwrap();
    assert_eq!(loaded.total_amount, Amount::from_str("37300.5").unwrap());
    assert_eq!(
        loaded.debts,
        [
            Debt::new("leasing", Amount::from_str("37250.5").unwrap()),
            Debt::new("faktura", 50),
        ]
    );
}

#[test]
fn get_by_id_for_missing_debtor_returns_none() {
    let scope = UnitOfWork::open_in_memory().unwrap();
    let repo = SqliteDebtorRepository::new(scope.connection());

    assert!(repo.get_by_id(404).unwrap().is_none());
}

#[test]
fn add_stores_in_memory_total_without_recomputing() {
    let scope = UnitOfWork::open_in_memory().unwrap();
    let repo = SqliteDebtorRepository::new(scope.connection());

    let mut debtor = jan_kowalski();
    debtor.total_amount = Amount::from(999);
    repo.add(&debtor).unwrap();

    let loaded = repo.get_by_id(1).unwrap().unwrap();
    assert_eq!(loaded.total_amount, Amount::from(999));
    assert_eq!(loaded.debts_total(), Amount::from(200_300));
}

#[test]
fn add_with_existing_id_is_a_write_error() {
    let scope = UnitOfWork::open_in_memory().unwrap();
    let repo = SqliteDebtorRepository::new(scope.connection());

    repo.add(&jan_kowalski()).unwrap();
    let err = repo.add(&Debtor::new(1, "Jan", "Nowak")).unwrap_err();

    assert!(matches!(
        err,
        RepoError::Write {
            op: WriteOp::Add,
            target: WriteTarget::Debtor(1),
            ..
        }
    ));
    assert!(err.is_constraint_violation());
    assert_eq!(repo.get_by_id(1).unwrap().unwrap().last_name, "Kowalski");
}

#[test]
fn two_debts_with_equal_amount_collide() {
    let scope = UnitOfWork::open_in_memory().unwrap();
    let repo = SqliteDebtorRepository::new(scope.connection());

    let debtor = Debtor::new(2, "Zygmunt", "Nowak")
        .with_debts([Debt::new("faktura", 1_500), Debt::new("abonament", 1_500)]);
    let err = repo.add(&debtor).unwrap_err();

    match &err {
        RepoError::Write {
            op: WriteOp::Add,
            target: WriteTarget::Debt { debt, debtor_id },
            ..
        } => {
            assert_eq!(debt, &Debt::new("abonament", 1_500));
            assert_eq!(*debtor_id, 2);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.is_constraint_violation());
    assert!(err.to_string().contains("abonament"));
}

#[test]
fn equal_amounts_for_different_debtors_do_not_collide() {
    let scope = UnitOfWork::open_in_memory().unwrap();
    let repo = SqliteDebtorRepository::new(scope.connection());

    repo.add(&Debtor::new(1, "Jan", "Kowalski").with_debts([Debt::new("faktura", 300)]))
        .unwrap();
    repo.add(&Debtor::new(2, "Zygmunt", "Nowak").with_debts([Debt::new("faktura", 300)]))
        .unwrap();

    assert_eq!(repo.get_by_id(1).unwrap().unwrap().debts.len(), 1);
    assert_eq!(repo.get_by_id(2).unwrap().unwrap().debts.len(), 1);
}

#[test]
fn delete_removes_debtor_and_debts() {
    let scope = UnitOfWork::open_in_memory().unwrap();
    let repo = SqliteDebtorRepository::new(scope.connection());

    let debtor = jan_kowalski();
    repo.add(&debtor).unwrap();
    repo.delete(&debtor).unwrap();

    assert!(repo.get_by_id(1).unwrap().is_none());
    let orphaned: i64 = scope
        .connection()
        .query_row("SELECT COUNT(*) FROM Debt WHERE debtor_id = 1;", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(orphaned, 0);
}

#[test]
fn delete_of_missing_debtor_is_not_an_error() {
    let scope = UnitOfWork::open_in_memory().unwrap();
    let repo = SqliteDebtorRepository::new(scope.connection());

    repo.delete(&Debtor::new(77, "Nikt", "Nieznany")).unwrap();
    repo.delete(&Debtor::new(77, "Nikt", "Nieznany")).unwrap();
}

#[test]
fn delete_uses_only_the_id() {
    let scope = UnitOfWork::open_in_memory().unwrap();
    let repo = SqliteDebtorRepository::new(scope.connection());

    repo.add(&jan_kowalski()).unwrap();
    repo.delete(&Debtor::new(1, "Inne", "Dane")).unwrap();

    assert!(repo.get_by_id(1).unwrap().is_none());
}

#[test]
fn update_replaces_whole_debt_set() {
    let scope = UnitOfWork::open_in_memory().unwrap();
    let repo = SqliteDebtorRepository::new(scope.connection());

    repo.add(&Debtor::new(4, "Marcin", "Kowal").with_debts([
        Debt::new("pożyczka", 3_400),
        Debt::new("zakupy ratalne", 2_000),
        Debt::new("faktury", 300),
    ]))
    .unwrap();

    let replacement = Debtor::new(4, "Marcin", "Kowalczyk")
        .with_debts([Debt::new("pożyczka", 3_400), Debt::new("faktury", 400)]);
    repo.update(&replacement).unwrap();

    let loaded = repo.get_by_id(4).unwrap().unwrap();
    assert_eq!(loaded.last_name, "Kowalczyk");
    assert_eq!(loaded.total_amount, Amount::from(3_800));
    assert_eq!(debt_set(&loaded), debt_set(&replacement));
}

#[test]
fn update_of_missing_debtor_adds_it() {
    let scope = UnitOfWork::open_in_memory().unwrap();
    let repo = SqliteDebtorRepository::new(scope.connection());

    repo.update(&jan_kowalski()).unwrap();

    assert_eq!(
        repo.get_by_id(1).unwrap().unwrap().total_amount,
        Amount::from(200_300)
    );
}

#[test]
fn update_failure_names_debtor_and_keeps_cause() {
    let scope = UnitOfWork::open_in_memory().unwrap();
    let repo = SqliteDebtorRepository::new(scope.connection());

    repo.add(&jan_kowalski()).unwrap();
    let broken = Debtor::new(1, "Jan", "Kowalski")
        .with_debts([Debt::new("a", 10), Debt::new("b", 10)]);
    let err = repo.update(&broken).unwrap_err();

    assert!(matches!(
        err,
        RepoError::Write {
            op: WriteOp::Update,
            target: WriteTarget::Debtor(1),
            ..
        }
    ));
    let cause = err.source().unwrap();
    assert!(cause.to_string().contains("to debtor 1"), "{cause}");
    assert!(err.is_constraint_violation());
}

#[test]
fn read_failure_is_reported_with_requested_id() {
    let scope = UnitOfWork::open_in_memory().unwrap();
    let repo = SqliteDebtorRepository::new(scope.connection());

    repo.add(&jan_kowalski()).unwrap();
    scope.connection().execute_batch("DROP TABLE Debt;").unwrap();

    let err = repo.get_by_id(1).unwrap_err();
    assert!(matches!(err, RepoError::Read { id: 1, .. }));
    assert_eq!(err.to_string(), "error getting debtor by id 1");
}

#[test]
fn delete_failure_is_reported_with_debtor_id() {
    let scope = UnitOfWork::open_in_memory().unwrap();
    let repo = SqliteDebtorRepository::new(scope.connection());

    scope.connection().execute_batch("DROP TABLE Debt;").unwrap();

    let err = repo.delete(&jan_kowalski()).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Write {
            op: WriteOp::Delete,
            target: WriteTarget::Debtor(1),
            ..
        }
    ));
}
